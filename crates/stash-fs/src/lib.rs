//! Filesystem layer for Tool Stash
//!
//! Normalized project-relative paths, atomic writes and format-agnostic
//! document loading. Everything above this crate reads and writes the
//! project tree through these helpers.

pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use constants::ProjectPath;
pub use error::{Error, Result};
pub use path::{NormalizedPath, validate_identifier};
