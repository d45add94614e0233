//! Error types for stash-meta

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] stash_fs::Error),

    #[error("Registry not found at {path}")]
    RegistryMissing { path: PathBuf },

    #[error("Registry at {path} is corrupt: {message}")]
    RegistryCorrupt { path: PathBuf, message: String },

    #[error("Invalid record for tool '{id}': {message}")]
    InvalidRecord { id: String, message: String },

    #[error("Run definitions not found at {path}")]
    RunsMissing { path: PathBuf },

    #[error("Run definitions at {path} are malformed: {message}")]
    RunsCorrupt { path: PathBuf, message: String },

    #[error("Malformed document at {path}: {message}")]
    DocumentCorrupt { path: PathBuf, message: String },
}
