//! Pre-detach backups of a tool's working tree
//!
//! A backup is a plain copy of `tools/<id>/` at
//! `<backups_dir>/<id>_<YYYYmmdd_HHMMSS>/`.

use chrono::{DateTime, Local};
use stash_fs::{NormalizedPath, io};

use crate::{Error, Result};

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// A completed backup.
#[derive(Debug, Clone)]
pub struct ToolBackup {
    pub tool: String,
    pub path: NormalizedPath,
    pub files: usize,
    pub created: DateTime<Local>,
}

/// Creates tool backups under a project's backup directory.
pub struct BackupManager {
    backups_dir: NormalizedPath,
}

impl BackupManager {
    /// `backups_dir` is relative to `root` unless absolute.
    pub fn new(root: &NormalizedPath, backups_dir: &str) -> Self {
        Self {
            backups_dir: crate::project_path(root, backups_dir),
        }
    }

    pub fn backups_dir(&self) -> &NormalizedPath {
        &self.backups_dir
    }

    /// Where a backup taken at `at` would go.
    pub fn backup_path(&self, tool: &str, at: DateTime<Local>) -> NormalizedPath {
        self.backups_dir
            .join(format!("{tool}_{}", at.format(TIMESTAMP_FORMAT)))
    }

    /// Copy `source` into a fresh timestamped backup directory.
    pub fn create_backup(&self, tool: &str, source: &NormalizedPath) -> Result<ToolBackup> {
        let created = Local::now();
        let path = self.backup_path(tool, created);

        if path.exists() {
            return Err(Error::BackupFailed {
                identifier: tool.to_string(),
                message: format!("{path} already exists"),
            });
        }

        let files = io::copy_dir_all(source, &path).map_err(|e| Error::BackupFailed {
            identifier: tool.to_string(),
            message: e.to_string(),
        })?;
        tracing::info!(tool, path = %path, files, "backup created");

        Ok(ToolBackup {
            tool: tool.to_string(),
            path,
            files,
            created,
        })
    }
}
