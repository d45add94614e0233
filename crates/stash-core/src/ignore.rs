//! Ignore-list maintenance for attached tools
//!
//! Each tool owns one line, `tools/<identifier>/`, below a `# Tools` header.
//! The text transforms are pure; [`IgnoreList`] applies them to `.gitignore`.

use stash_fs::{NormalizedPath, ProjectPath, io};

use crate::Result;

/// Header line grouping tool entries.
pub const TOOLS_HEADER: &str = "# Tools";

/// Content written when the project has no ignore file yet.
pub const DEFAULT_IGNORE: &str = "\
# Python
__pycache__/
*.py[cod]
*$py.class

# Virtual environments
.venv/
venv/

# IDE
.vscode/
.idea/

# OS
.DS_Store
Thumbs.db

# Tools
";

/// The ignore pattern for a tool.
pub fn tool_pattern(id: &str) -> String {
    format!("{}/{id}/", ProjectPath::ToolsDir.as_str())
}

/// Whether `content` already has the tool's line.
pub fn contains_entry(content: &str, id: &str) -> bool {
    let pattern = tool_pattern(id);
    content.lines().any(|line| line.trim() == pattern)
}

/// Append the tool's line, adding the header if absent.
///
/// Returns `None` when the entry is already present.
pub fn add_entry(content: &str, id: &str) -> Option<String> {
    if contains_entry(content, id) {
        return None;
    }

    let mut updated = content.to_string();
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    if !updated.lines().any(|line| line.trim() == TOOLS_HEADER) {
        updated.push('\n');
        updated.push_str(TOOLS_HEADER);
        updated.push('\n');
    }
    updated.push_str(&tool_pattern(id));
    updated.push('\n');
    Some(updated)
}

/// Drop every line equal to the tool's pattern.
///
/// Returns `None` when there was nothing to remove.
pub fn remove_entry(content: &str, id: &str) -> Option<String> {
    if !contains_entry(content, id) {
        return None;
    }
    let pattern = tool_pattern(id);
    let kept: Vec<&str> = content
        .split('\n')
        .filter(|line| line.trim() != pattern)
        .collect();
    Some(kept.join("\n"))
}

/// What an ignore-list operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreChange {
    /// The file did not exist and was created with the default header
    Created,
    Added,
    Removed,
    /// Nothing to do
    Unchanged,
}

/// The project's `.gitignore`.
#[derive(Debug, Clone)]
pub struct IgnoreList {
    path: NormalizedPath,
}

impl IgnoreList {
    pub fn for_project(root: &NormalizedPath) -> Self {
        Self {
            path: root.join(ProjectPath::GitIgnore),
        }
    }

    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    pub fn contains(&self, id: &str) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        Ok(contains_entry(&io::read_text(&self.path)?, id))
    }

    /// Add the tool's line. Idempotent.
    pub fn add_tool(&self, id: &str) -> Result<IgnoreChange> {
        let (content, created) = if self.path.exists() {
            (io::read_text(&self.path)?, false)
        } else {
            tracing::info!(path = %self.path, "ignore file not found, creating one");
            (DEFAULT_IGNORE.to_string(), true)
        };

        match add_entry(&content, id) {
            Some(updated) => {
                io::write_text(&self.path, &updated)?;
                tracing::debug!(id, "added ignore entry");
                Ok(if created {
                    IgnoreChange::Created
                } else {
                    IgnoreChange::Added
                })
            }
            None if created => {
                io::write_text(&self.path, &content)?;
                Ok(IgnoreChange::Created)
            }
            None => Ok(IgnoreChange::Unchanged),
        }
    }

    /// Remove the tool's line. Idempotent; a missing file is not an error.
    pub fn remove_tool(&self, id: &str) -> Result<IgnoreChange> {
        if !self.path.exists() {
            return Ok(IgnoreChange::Unchanged);
        }
        let content = io::read_text(&self.path)?;
        match remove_entry(&content, id) {
            Some(updated) => {
                io::write_text(&self.path, &updated)?;
                Ok(IgnoreChange::Removed)
            }
            None => Ok(IgnoreChange::Unchanged),
        }
    }
}
