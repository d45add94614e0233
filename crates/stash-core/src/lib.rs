//! Lifecycle orchestration for Tool Stash
//!
//! This crate coordinates the lower layers to attach and detach tools and
//! to check the project for consistency:
//!
//! - **Attach / detach controllers**: step-wise flows on [`Stash`] that
//!   report each step as a [`StepOutcome`]
//! - **Entrypoint resolution**: locating a tool's entry reference
//! - **Ignore list**: the `# Tools` block of `.gitignore`
//! - **Consistency validation**: read-only [`Validator`] over registry, runs
//!   and configuration documents
//!
//! # Architecture
//!
//! ```text
//!                  stash-cli
//!                      |
//!                 stash-core
//!                      |
//!       +--------------+--------------+
//!       |              |              |
//!   stash-fs       stash-git      stash-meta
//! ```
//!
//! # Example
//!
//! ```no_run
//! use stash_core::{AttachRequest, Stash};
//! use stash_fs::NormalizedPath;
//!
//! fn example() -> stash_core::Result<()> {
//!     let stash = Stash::open(NormalizedPath::new("."))?;
//!     let summary = stash.attach(&AttachRequest::new(
//!         "demo-tool",
//!         "https://github.com/example/demo-tool",
//!     ))?;
//!     println!("attached at {}", summary.root_path);
//!     Ok(())
//! }
//! ```

pub mod attach;
pub mod backup;
pub mod detach;
pub mod entrypoint;
pub mod error;
pub mod ignore;
pub mod outcome;
pub mod prereq;
pub mod scaffold;
pub mod settings;
pub mod stash;
pub mod usage;
pub mod validate;

pub use attach::{AttachRequest, AttachSummary};
pub use backup::{BackupManager, ToolBackup};
pub use detach::{Confirmation, DetachPlan, DetachRequest, DetachSummary};
pub use entrypoint::EntryReference;
pub use error::{Error, Result};
pub use ignore::{IgnoreChange, IgnoreList};
pub use outcome::{OutcomeLevel, Outcomes, StepOutcome, StepRecord};
pub use prereq::{ToolVersion, check_prerequisites};
pub use settings::StashSettings;
pub use stash::{Stash, discover_root};
pub use validate::{Finding, FindingKind, Severity, ValidationMode, ValidationReport, Validator};

use std::path::Path;

use stash_fs::NormalizedPath;

/// Resolve a project-relative path, leaving absolute ones as given.
pub(crate) fn project_path(root: &NormalizedPath, rel: &str) -> NormalizedPath {
    if Path::new(rel).is_absolute() {
        NormalizedPath::new(rel)
    } else {
        root.join(rel)
    }
}
