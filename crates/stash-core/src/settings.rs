//! Optional project settings (`.stash/config.toml`)
//!
//! # Example TOML
//!
//! ```toml
//! command_timeout_secs = 600
//! required_executables = ["git"]
//! accepted_url_prefixes = ["https://github.com/", "https://gitlab.com/"]
//! default_branch = "develop"
//! backups_dir = "archive/backups"
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use stash_fs::{ConfigStore, NormalizedPath, ProjectPath};

use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StashSettings {
    /// Per-command timeout for git and uv
    pub command_timeout_secs: u64,
    /// Executables that must answer `--version` before attaching
    pub required_executables: Vec<String>,
    /// Source URLs must start with one of these
    pub accepted_url_prefixes: Vec<String>,
    pub default_branch: String,
    /// Backup root, relative to the project
    pub backups_dir: String,
}

impl Default for StashSettings {
    fn default() -> Self {
        Self {
            command_timeout_secs: 300,
            required_executables: vec!["git".into(), "uv".into()],
            accepted_url_prefixes: vec!["https://github.com/".into(), "git@github.com:".into()],
            default_branch: "main".into(),
            backups_dir: ProjectPath::BackupsDir.as_str().into(),
        }
    }
}

impl StashSettings {
    /// Load settings for a project; defaults when the file is absent.
    pub fn load(root: &NormalizedPath) -> Result<Self> {
        let path = root.join(ProjectPath::Settings);
        let settings = ConfigStore::new().load_optional(&path)?;
        match settings {
            Some(settings) => {
                tracing::debug!(path = %path, "loaded settings");
                Ok(settings)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn accepts_url(&self, url: &str) -> bool {
        self.accepted_url_prefixes
            .iter()
            .any(|prefix| url.starts_with(prefix.as_str()))
    }
}
