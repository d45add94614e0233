//! Well-known paths inside a host project.

use std::path::Path;

/// Standard project-relative paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectPath {
    /// Directory holding attached tools (`tools`)
    ToolsDir,
    /// Configuration tree (`configs`)
    ConfigsDir,
    /// Metadata registry (`configs/meta.yaml`)
    Registry,
    /// Run definitions (`configs/runs.yaml`)
    Runs,
    /// Ignore list (`.gitignore`)
    GitIgnore,
    /// Git database marker (`.git`)
    GitDir,
    /// Default backup root (`backups`)
    BackupsDir,
    /// Optional local settings (`.stash/config.toml`)
    Settings,
}

impl ProjectPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToolsDir => "tools",
            Self::ConfigsDir => "configs",
            Self::Registry => "configs/meta.yaml",
            Self::Runs => "configs/runs.yaml",
            Self::GitIgnore => ".gitignore",
            Self::GitDir => ".git",
            Self::BackupsDir => "backups",
            Self::Settings => ".stash/config.toml",
        }
    }
}

impl AsRef<Path> for ProjectPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for ProjectPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for ProjectPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
