//! Per-tool experiment documents (`configs/**/*.yaml`)

use serde_yaml::{Mapping, Value};
use stash_fs::{NormalizedPath, io};

use crate::tools::scalar_text;
use crate::{Error, Result};

/// Fields every experiment document must carry.
pub const REQUIRED_FIELDS: [&str; 5] = [
    "tool",
    "experiment",
    "description",
    "tags",
    "estimated_runtime",
];

/// Experiment name written into scaffolded example documents.
pub const EXAMPLE_EXPERIMENT: &str = "example_experiment";

/// A configuration document, kept as its raw mapping.
///
/// Required fields are checked for presence only; their values may be any
/// YAML (`estimated_runtime: 30`, `tags: demo`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExperimentDocument {
    fields: Mapping,
}

impl ExperimentDocument {
    /// The example document scaffolded for a newly attached tool.
    pub fn example(id: &str) -> Self {
        let mut fields = Mapping::new();
        let mut set = |key: &str, value: Value| {
            fields.insert(Value::String(key.into()), value);
        };
        set("tool", Value::String(id.into()));
        set("experiment", Value::String(EXAMPLE_EXPERIMENT.into()));
        set("description", Value::String(format!("Example experiment for {id}")));
        set(
            "tags",
            Value::Sequence(vec![Value::String("example".into()), Value::String("demo".into())]),
        );
        set("estimated_runtime", Value::String("5m".into()));
        Self { fields }
    }

    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let content = io::read_text(path)?;
        Self::parse(&content).map_err(|message| Error::DocumentCorrupt {
            path: path.to_native(),
            message,
        })
    }

    /// Fails only when the text is not YAML or not a mapping.
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        match serde_yaml::from_str(content).map_err(|e| e.to_string())? {
            Value::Mapping(fields) => Ok(Self { fields }),
            _ => Err("top level is not a mapping".to_string()),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The `tool` value rendered as text, when it is a scalar.
    pub fn tool(&self) -> Option<String> {
        self.get("tool").and_then(scalar_text)
    }

    /// The `experiment` value rendered as text, when it is a scalar.
    pub fn experiment(&self) -> Option<String> {
        self.get("experiment").and_then(scalar_text)
    }

    /// Required fields whose keys are absent.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .into_iter()
            .filter(|field| !self.fields.contains_key(*field))
            .collect()
    }

    pub fn to_yaml(&self) -> std::result::Result<String, String> {
        serde_yaml::to_string(&self.fields).map_err(|e| e.to_string())
    }
}

/// The `tool` value of a YAML document, if it has a scalar one.
///
/// Anything unparseable yields `None`.
pub fn referenced_tool(content: &str) -> Option<String> {
    let value: Value = serde_yaml::from_str(content).ok()?;
    value.get("tool").and_then(scalar_text)
}
