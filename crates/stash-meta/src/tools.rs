//! Tool records stored under `tools.<identifier>` in the registry
//!
//! # Example YAML
//!
//! ```yaml
//! tools:
//!   demo-tool:
//!     path: tools/demo-tool
//!     entrypoint: src/main.py
//!     commit: HEAD
//!     branch: main
//!     dependencies: []
//!     description: 'Added via plugin: demo-tool'
//! ```

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};

/// Revision value meaning "follow the tracked branch tip".
pub const HEAD_REVISION: &str = "HEAD";

/// Branch recorded when none is given.
pub const DEFAULT_BRANCH: &str = "main";

fn default_commit() -> String {
    HEAD_REVISION.to_string()
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

/// Render a YAML scalar as text. `1234567` (a short SHA) reads as an integer.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn optional_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(d)? {
        Value::Null => Ok(None),
        value => scalar_text(&value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected a scalar, found {value:?}"))),
    }
}

fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(optional_text(d)?.unwrap_or_default())
}

fn commit_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(optional_text(d)?.unwrap_or_else(default_commit))
}

fn branch_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(optional_text(d)?.unwrap_or_else(default_branch))
}

/// A list of scalars, a single scalar, or nothing.
fn text_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    match Value::deserialize(d)? {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => items
            .iter()
            .map(|item| {
                scalar_text(item)
                    .ok_or_else(|| D::Error::custom(format!("expected a scalar, found {item:?}")))
            })
            .collect(),
        value => scalar_text(&value)
            .map(|single| vec![single])
            .ok_or_else(|| D::Error::custom(format!("expected a list, found {value:?}"))),
    }
}

/// One attached tool.
///
/// Scalar fields accept any YAML scalar and a blank value takes the default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRecord {
    /// Root path relative to the project, `tools/<identifier>` by convention
    #[serde(default, deserialize_with = "text")]
    pub path: String,
    /// File path under `path`, or `-m <module>`
    #[serde(default, deserialize_with = "text")]
    pub entrypoint: String,
    /// Pinned revision; [`HEAD_REVISION`] follows the branch tip
    #[serde(default = "default_commit", deserialize_with = "commit_text")]
    pub commit: String,
    #[serde(default = "default_branch", deserialize_with = "branch_text")]
    pub branch: String,
    /// Identifiers of tools this one depends on
    #[serde(default, deserialize_with = "text_list")]
    pub dependencies: Vec<String>,
    #[serde(default, deserialize_with = "text")]
    pub description: String,
    /// Keys this crate does not model (e.g. `python_version`)
    #[serde(flatten)]
    pub extra: Mapping,
}

impl ToolRecord {
    /// The record attach writes for a freshly added tool.
    pub fn attached(id: &str, path: impl Into<String>, entrypoint: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            entrypoint: entrypoint.into(),
            commit: default_commit(),
            branch: default_branch(),
            dependencies: Vec::new(),
            description: format!("Added via plugin: {id}"),
            extra: Mapping::new(),
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn with_commit(mut self, commit: impl Into<String>) -> Self {
        self.commit = commit.into();
        self
    }

    /// Whether the record follows the branch tip instead of a pinned revision.
    pub fn is_floating(&self) -> bool {
        self.commit == HEAD_REVISION
    }

    pub fn depends_on(&self, id: &str) -> bool {
        self.dependencies.iter().any(|dep| dep == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn attached_record_defaults() {
        let record = ToolRecord::attached("demo", "tools/demo", "src/main.py");
        assert_eq!(record.commit, "HEAD");
        assert_eq!(record.branch, "main");
        assert_eq!(record.description, "Added via plugin: demo");
        assert!(record.dependencies.is_empty());
        assert!(record.is_floating());
    }

    #[test]
    fn missing_keys_take_defaults() {
        let record: ToolRecord = serde_yaml::from_str("path: tools/x\n").unwrap();
        assert_eq!(record.path, "tools/x");
        assert_eq!(record.entrypoint, "");
        assert_eq!(record.commit, "HEAD");
        assert_eq!(record.branch, "main");
    }

    #[test]
    fn numeric_and_blank_scalars_are_accepted() {
        let yaml = "path: tools/x\ncommit: 1234567\nbranch:\ndescription:\ndependencies: alpha\n";
        let record: ToolRecord = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(record.commit, "1234567");
        assert!(!record.is_floating());
        assert_eq!(record.branch, "main");
        assert_eq!(record.description, "");
        assert_eq!(record.dependencies, vec!["alpha".to_string()]);
    }

    #[test]
    fn nested_values_do_not_fit() {
        assert!(serde_yaml::from_str::<ToolRecord>("path: {a: b}\n").is_err());
        assert!(serde_yaml::from_str::<ToolRecord>("dependencies: [[a]]\n").is_err());
    }

    #[test]
    fn unknown_keys_survive() {
        let yaml = "path: tools/x\nentrypoint: main.py\npython_version: '3.11'\n";
        let record: ToolRecord = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            record.extra.get("python_version").and_then(|v| v.as_str()),
            Some("3.11")
        );

        let rendered = serde_yaml::to_string(&record).unwrap();
        let reparsed: ToolRecord = serde_yaml::from_str(&rendered).unwrap();
        assert_eq!(reparsed, record);
    }
}
