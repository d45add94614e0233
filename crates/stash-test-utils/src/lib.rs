//! Shared test utilities for the tool-stash workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`]: git repository fixtures
//! - [`project`]: [`project::TestProject`] builder for host-project layouts
//! - [`runner`]: [`runner::FakeRunner`], a scripted command runner

pub mod git;
pub mod project;
pub mod runner;
