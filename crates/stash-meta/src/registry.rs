//! The metadata registry document (`configs/meta.yaml`)
//!
//! A [`RegistryDocument`] is an explicit value: load it, mutate it, save it.
//! Nothing is cached between operations. Top-level key order and tool
//! order survive a load/save cycle; replacing a tool keeps its position.

use serde_yaml::{Mapping, Value};
use stash_fs::{ConfigStore, NormalizedPath, ProjectPath};

use crate::tools::{ToolRecord, scalar_text};
use crate::validation::ValidationPolicy;
use crate::{Error, Result};

/// Top-level sections a well-formed registry carries.
pub const REQUIRED_SECTIONS: [&str; 3] = ["tools", "experiment", "validation"];

const TOOLS_KEY: &str = "tools";
const VALIDATION_KEY: &str = "validation";

/// One entry of the `tools` section.
#[derive(Debug, Clone, PartialEq)]
struct ToolEntry {
    id: String,
    /// The value as loaded; `None` once the record has been replaced
    raw: Option<Value>,
    /// The typed record, or why the entry does not fit one
    record: std::result::Result<ToolRecord, String>,
}

impl ToolEntry {
    fn valid(&self) -> Option<&ToolRecord> {
        self.record.as_ref().ok()
    }
}

/// In-memory registry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryDocument {
    /// Every top-level section; `tools` holds a placeholder rebuilt on save
    root: Mapping,
    tools: Vec<ToolEntry>,
}

impl RegistryDocument {
    /// Parse registry YAML.
    ///
    /// Fails when the text is not YAML, the root is not a mapping, or `tools`
    /// is present but not a mapping. A tool entry that does not fit
    /// [`ToolRecord`] is kept as-is and listed by
    /// [`RegistryDocument::invalid_tools`].
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        let value: Value = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
        Self::from_value(value)
    }

    fn from_value(value: Value) -> std::result::Result<Self, String> {
        let Value::Mapping(mut root) = value else {
            return Err("top level is not a mapping".to_string());
        };

        let tools = match root.get(TOOLS_KEY) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Mapping(entries)) => entries
                .iter()
                .map(|(key, value)| {
                    let id = scalar_text(key)
                        .ok_or_else(|| format!("tool key {key:?} is not a scalar"))?;
                    let record = serde_yaml::from_value::<ToolRecord>(value.clone())
                        .map_err(|e| e.to_string());
                    if let Err(message) = &record {
                        tracing::warn!(id = %id, %message, "registry record does not fit");
                    }
                    Ok(ToolEntry {
                        id,
                        raw: Some(value.clone()),
                        record,
                    })
                })
                .collect::<std::result::Result<_, String>>()?,
            Some(_) => return Err("'tools' is not a mapping".to_string()),
        };

        // Keep the key's position only; records live in `tools`
        if let Some(slot) = root.get_mut(TOOLS_KEY) {
            *slot = Value::Null;
        }
        Ok(Self { root, tools })
    }

    /// Render back to a YAML mapping.
    pub fn to_mapping(&self) -> Result<Mapping> {
        let mut root = self.root.clone();
        if root.contains_key(TOOLS_KEY) || !self.tools.is_empty() {
            let mut table = Mapping::new();
            for entry in &self.tools {
                // Untouched entries are written back exactly as loaded
                let value = match (&entry.raw, &entry.record) {
                    (Some(raw), _) => raw.clone(),
                    (None, Ok(record)) => {
                        serde_yaml::to_value(record).map_err(|e| Error::InvalidRecord {
                            id: entry.id.clone(),
                            message: e.to_string(),
                        })?
                    }
                    (None, Err(message)) => {
                        return Err(Error::InvalidRecord {
                            id: entry.id.clone(),
                            message: message.clone(),
                        });
                    }
                };
                table.insert(Value::String(entry.id.clone()), value);
            }
            // Existing key keeps its position; a new one is appended
            root.insert(Value::String(TOOLS_KEY.into()), Value::Mapping(table));
        }
        Ok(root)
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.root.contains_key(name)
    }

    /// Required sections that are absent.
    pub fn missing_sections(&self) -> Vec<&'static str> {
        REQUIRED_SECTIONS
            .into_iter()
            .filter(|section| !self.has_section(section))
            .collect()
    }

    /// Raw value of a top-level section.
    pub fn section(&self, name: &str) -> Option<&Value> {
        self.root.get(name)
    }

    fn entry(&self, id: &str) -> Option<&ToolEntry> {
        self.tools.iter().find(|entry| entry.id == id)
    }

    /// The typed record for `id`; `None` when absent or not a valid record.
    pub fn tool(&self, id: &str) -> Option<&ToolRecord> {
        self.entry(id).and_then(ToolEntry::valid)
    }

    /// Valid tool records in document order.
    pub fn tools(&self) -> impl Iterator<Item = (&str, &ToolRecord)> {
        self.tools
            .iter()
            .filter_map(|entry| entry.valid().map(|record| (entry.id.as_str(), record)))
    }

    /// Entries that do not fit a tool record, with the reason.
    pub fn invalid_tools(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tools.iter().filter_map(|entry| match &entry.record {
            Ok(_) => None,
            Err(message) => Some((entry.id.as_str(), message.as_str())),
        })
    }

    /// Every registered identifier, valid record or not.
    pub fn tool_ids(&self) -> Vec<&str> {
        self.tools.iter().map(|entry| entry.id.as_str()).collect()
    }

    pub fn contains_tool(&self, id: &str) -> bool {
        self.entry(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Add a tool, or fully replace an existing one in place.
    pub fn upsert_tool(&mut self, id: &str, record: ToolRecord) {
        let entry = ToolEntry {
            id: id.to_string(),
            raw: None,
            record: Ok(record),
        };
        if let Some(slot) = self.tools.iter_mut().find(|slot| slot.id == id) {
            tracing::debug!(id, "replacing registry record");
            *slot = entry;
        } else {
            tracing::debug!(id, "adding registry record");
            self.tools.push(entry);
        }
        if !self.root.contains_key(TOOLS_KEY) {
            self.root.insert(Value::String(TOOLS_KEY.into()), Value::Null);
        }
    }

    /// Remove a tool. Returns `false` (and changes nothing) when absent.
    pub fn remove_tool(&mut self, id: &str) -> bool {
        let before = self.tools.len();
        self.tools.retain(|entry| entry.id != id);
        let removed = self.tools.len() != before;
        if removed {
            tracing::debug!(id, "removed registry record");
        } else {
            tracing::info!(id, "tool not present in registry; nothing to remove");
        }
        removed
    }

    /// Identifiers of tools whose `dependencies` name `id`.
    pub fn dependents_of(&self, id: &str) -> Vec<String> {
        self.tools()
            .filter(|(key, record)| *key != id && record.depends_on(id))
            .map(|(key, _)| key.to_string())
            .collect()
    }

    /// The `validation` section; defaults when absent.
    pub fn validation_policy(&self) -> std::result::Result<ValidationPolicy, String> {
        match self.root.get(VALIDATION_KEY) {
            None | Some(Value::Null) => Ok(ValidationPolicy::default()),
            Some(value) => serde_yaml::from_value(value.clone()).map_err(|e| e.to_string()),
        }
    }
}

/// Loads and saves the registry file.
#[derive(Debug, Clone)]
pub struct RegistryStore {
    path: NormalizedPath,
    store: ConfigStore,
}

impl RegistryStore {
    pub fn new(path: NormalizedPath) -> Self {
        Self {
            path,
            store: ConfigStore::new(),
        }
    }

    /// Store for `configs/meta.yaml` under a project root.
    pub fn for_project(root: &NormalizedPath) -> Self {
        Self::new(root.join(ProjectPath::Registry))
    }

    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read and parse the registry.
    pub fn load(&self) -> Result<RegistryDocument> {
        let value: Value = self.store.load(&self.path).map_err(|e| match e {
            e if e.is_not_found() => Error::RegistryMissing {
                path: self.path.to_native(),
            },
            stash_fs::Error::ConfigParse { message, .. } => Error::RegistryCorrupt {
                path: self.path.to_native(),
                message,
            },
            other => Error::Fs(other),
        })?;

        let doc = RegistryDocument::from_value(value).map_err(|message| Error::RegistryCorrupt {
            path: self.path.to_native(),
            message,
        })?;
        tracing::debug!(path = %self.path, tools = doc.len(), "loaded registry");
        Ok(doc)
    }

    /// Serialize and atomically replace the registry file.
    pub fn save(&self, doc: &RegistryDocument) -> Result<()> {
        let mapping = doc.to_mapping()?;
        self.store.save(&self.path, &mapping)?;
        tracing::debug!(path = %self.path, tools = doc.len(), "saved registry");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
project: demo
tools:
  alpha:
    path: tools/alpha
    entrypoint: src/main.py
    commit: HEAD
    branch: main
    dependencies: []
    description: first
  beta:
    path: tools/beta
    entrypoint: -m src.main
    dependencies: [alpha]
experiment:
  default: baseline
validation:
  require_pinned_commits: false
";

    #[test]
    fn parses_tools_in_order() {
        let doc = RegistryDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.tool_ids(), vec!["alpha", "beta"]);
        assert_eq!(doc.tool("beta").unwrap().entrypoint, "-m src.main");
        assert!(doc.missing_sections().is_empty());
    }

    #[test]
    fn rejects_non_mapping_root() {
        assert!(RegistryDocument::parse("- a\n- b\n").is_err());
        assert!(RegistryDocument::parse("tools: [a, b]\n").is_err());
    }

    #[test]
    fn missing_sections_are_reported() {
        let doc = RegistryDocument::parse("tools: {}\n").unwrap();
        assert_eq!(doc.missing_sections(), vec!["experiment", "validation"]);
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut doc = RegistryDocument::parse(SAMPLE).unwrap();
        let replacement = ToolRecord::attached("alpha", "tools/alpha", "main.py");
        doc.upsert_tool("alpha", replacement.clone());

        assert_eq!(doc.tool_ids(), vec!["alpha", "beta"]);
        assert_eq!(doc.tool("alpha"), Some(&replacement));
    }

    #[test]
    fn upsert_into_empty_document_creates_section() {
        let mut doc = RegistryDocument::parse("experiment: {}\n").unwrap();
        doc.upsert_tool("x", ToolRecord::attached("x", "tools/x", "src/main.py"));

        let mapping = doc.to_mapping().unwrap();
        let keys: Vec<_> = mapping.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, vec!["experiment", "tools"]);
    }

    #[test]
    fn remove_absent_changes_nothing() {
        let mut doc = RegistryDocument::parse(SAMPLE).unwrap();
        let before = doc.clone();
        assert!(!doc.remove_tool("ghost"));
        assert_eq!(doc, before);
    }

    #[test]
    fn dependents_are_found() {
        let doc = RegistryDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.dependents_of("alpha"), vec!["beta".to_string()]);
        assert!(doc.dependents_of("beta").is_empty());
    }

    #[test]
    fn section_order_is_preserved() {
        let doc = RegistryDocument::parse(SAMPLE).unwrap();
        let mapping = doc.to_mapping().unwrap();
        let keys: Vec<_> = mapping.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, vec!["project", "tools", "experiment", "validation"]);
    }
}
