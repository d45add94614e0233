//! Run definitions (`configs/runs.yaml`)
//!
//! ```yaml
//! runs:
//!   quick-demo:
//!     tool: demo-tool
//!     config: example_demo-tool
//!     description: Smoke run
//! ```
//!
//! `config` names a document under the configs directory without its
//! extension: `example_demo-tool` resolves to `configs/example_demo-tool.yaml`.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use stash_fs::{NormalizedPath, io};

use crate::{Error, Result};

/// One named run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunDefinition {
    #[serde(default)]
    pub tool: Option<String>,
    #[serde(default)]
    pub config: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Mapping,
}

impl RunDefinition {
    /// Path of the referenced configuration document.
    pub fn config_path(&self, configs_dir: &NormalizedPath) -> Option<NormalizedPath> {
        self.config
            .as_deref()
            .map(|config| configs_dir.join(format!("{config}.yaml")))
    }
}

/// All runs in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunDefinitions {
    runs: Vec<(String, RunDefinition)>,
}

impl RunDefinitions {
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let content = io::read_text(path).map_err(|e| {
            if e.is_not_found() {
                Error::RunsMissing {
                    path: path.to_native(),
                }
            } else {
                Error::Fs(e)
            }
        })?;
        Self::parse(&content).map_err(|message| Error::RunsCorrupt {
            path: path.to_native(),
            message,
        })
    }

    /// Parse run-definition YAML. A document without `runs` has no runs.
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        let value: Value = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
        let runs = match value {
            Value::Null => return Ok(Self::default()),
            Value::Mapping(mut root) => root.remove("runs").unwrap_or(Value::Null),
            _ => return Err("top level is not a mapping".to_string()),
        };

        let entries = match runs {
            Value::Null => return Ok(Self::default()),
            Value::Mapping(entries) => entries,
            _ => return Err("'runs' is not a mapping".to_string()),
        };

        let runs = entries
            .into_iter()
            .map(|(key, value)| {
                let name = key
                    .as_str()
                    .ok_or_else(|| format!("run key {key:?} is not a string"))?
                    .to_string();
                let definition: RunDefinition = serde_yaml::from_value(value)
                    .map_err(|e| format!("run '{name}': {e}"))?;
                Ok((name, definition))
            })
            .collect::<std::result::Result<_, String>>()?;
        Ok(Self { runs })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RunDefinition)> {
        self.runs.iter().map(|(name, def)| (name.as_str(), def))
    }

    pub fn get(&self, name: &str) -> Option<&RunDefinition> {
        self.runs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, def)| def)
    }

    /// Runs that use tool `id`.
    pub fn using_tool<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.runs
            .iter()
            .filter(move |(_, def)| def.tool.as_deref() == Some(id))
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}
