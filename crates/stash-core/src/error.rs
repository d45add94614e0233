//! Error types for stash-core

/// Result type for stash-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in stash-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Identifier, URL or target path rejected before anything ran
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// A required executable is missing or the project is not a work tree
    #[error("Environment not ready: {message}")]
    EnvironmentUnready { message: String },

    /// The submodule could not be added after tolerated retries
    #[error("Failed to attach {identifier}: {message}")]
    AttachFailed { identifier: String, message: String },

    /// No tool directory at the expected path
    #[error("Tool '{identifier}' not found at {path}")]
    NotFound { identifier: String, path: String },

    /// The directory exists but has no `.git` marker
    #[error("'{identifier}' is not a git submodule")]
    NotATrackedUnit { identifier: String },

    #[error("Backup of '{identifier}' failed: {message}")]
    BackupFailed { identifier: String, message: String },

    /// The user declined the confirmation prompt
    #[error("Detach cancelled by user")]
    Cancelled,

    // Transparent wrappers for underlying crate errors
    /// Registry or document error from stash-meta
    #[error(transparent)]
    Registry(#[from] stash_meta::Error),

    /// Filesystem error from stash-fs
    #[error(transparent)]
    Fs(#[from] stash_fs::Error),

    /// Git error from stash-git
    #[error(transparent)]
    Git(#[from] stash_git::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn environment(message: impl Into<String>) -> Self {
        Self::EnvironmentUnready {
            message: message.into(),
        }
    }
}
