//! Git adapter for Tool Stash
//!
//! Wraps the `git` executable for the operations the lifecycle controllers
//! need: adding and removing submodules, purging leftover state and
//! clearing index entries. Every invocation goes through a
//! [`CommandRunner`], which never fails for an ordinary non-zero exit and
//! reports timeouts distinctly.

pub mod error;
pub mod git;
pub mod index;
pub mod runner;
pub mod submodule;

pub use error::{Error, Result};
pub use git::Git;
pub use runner::{CommandOutput, CommandRunner, DEFAULT_TIMEOUT, RunStatus, SystemRunner};
pub use submodule::{
    AttachAttempt, AttachReport, AttachState, DetachReport, FailureShape, PurgeReport,
};
