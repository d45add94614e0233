//! Error types for stash-git

use std::path::PathBuf;

/// Result type for stash-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in stash-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Filesystem error: {0}")]
    Fs(#[from] stash_fs::Error),

    #[error("Failed to add submodule at {path} after {attempts} attempt(s): {message}")]
    SubmoduleAddFailed {
        path: String,
        attempts: usize,
        message: String,
    },

    #[error("Not a git repository: {path}")]
    NotARepository { path: PathBuf },
}
