//! Integration tests for the registry store

use pretty_assertions::assert_eq;
use stash_fs::NormalizedPath;
use stash_meta::{Error, RegistryStore, ToolRecord};
use std::fs;
use tempfile::TempDir;

const REGISTRY: &str = "\
tools:
  alpha:
    path: tools/alpha
    entrypoint: src/main.py
    commit: HEAD
    branch: main
    dependencies: []
    description: 'Added via plugin: alpha'
    python_version: '3.11'
  beta:
    path: tools/beta
    entrypoint: -m src.main
    commit: 3f2a9c1
    branch: develop
    dependencies:
    - alpha
    description: Second tool
experiment:
  default: baseline
validation:
  require_pinned_commits: true
";

fn store_with(content: &str) -> (TempDir, RegistryStore) {
    let temp = TempDir::new().unwrap();
    let root = NormalizedPath::new(temp.path());
    let store = RegistryStore::for_project(&root);
    fs::create_dir_all(temp.path().join("configs")).unwrap();
    fs::write(store.path().to_native(), content).unwrap();
    (temp, store)
}

#[test]
fn load_save_load_round_trip() {
    let (_temp, store) = store_with(REGISTRY);

    let first = store.load().unwrap();
    store.save(&first).unwrap();
    let second = store.load().unwrap();

    assert_eq!(first.tool_ids(), second.tool_ids());
    for id in first.tool_ids() {
        assert_eq!(first.tool(id), second.tool(id));
    }
    assert_eq!(
        second
            .tool("alpha")
            .unwrap()
            .extra
            .get("python_version")
            .and_then(|v| v.as_str()),
        Some("3.11")
    );
    assert!(second.validation_policy().unwrap().require_pinned_commits);
    assert!(second.missing_sections().is_empty());
}

#[test]
fn missing_file_is_registry_missing() {
    let temp = TempDir::new().unwrap();
    let store = RegistryStore::for_project(&NormalizedPath::new(temp.path()));

    assert!(matches!(store.load(), Err(Error::RegistryMissing { .. })));
}

#[test]
fn invalid_yaml_is_registry_corrupt() {
    let (_temp, store) = store_with("tools: [unclosed\n");
    assert!(matches!(store.load(), Err(Error::RegistryCorrupt { .. })));
}

#[test]
fn scalar_root_is_registry_corrupt() {
    let (_temp, store) = store_with("just a string\n");
    assert!(matches!(store.load(), Err(Error::RegistryCorrupt { .. })));
}

#[test]
fn upsert_then_save_persists_record() {
    let (_temp, store) = store_with(REGISTRY);
    let mut doc = store.load().unwrap();

    doc.upsert_tool(
        "gamma",
        ToolRecord::attached("gamma", "tools/gamma", "main.py"),
    );
    store.save(&doc).unwrap();

    let reloaded = store.load().unwrap();
    assert_eq!(reloaded.tool_ids(), vec!["alpha", "beta", "gamma"]);
    let gamma = reloaded.tool("gamma").unwrap();
    assert_eq!(gamma.path, "tools/gamma");
    assert_eq!(gamma.description, "Added via plugin: gamma");
}

#[test]
fn removing_absent_tool_leaves_file_unchanged_in_meaning() {
    let (_temp, store) = store_with(REGISTRY);
    let mut doc = store.load().unwrap();
    let before = doc.clone();

    assert!(!doc.remove_tool("ghost"));
    store.save(&doc).unwrap();

    assert_eq!(store.load().unwrap(), before);
}

#[test]
fn remove_then_dependents_disappear() {
    let (_temp, store) = store_with(REGISTRY);
    let mut doc = store.load().unwrap();
    assert_eq!(doc.dependents_of("alpha"), vec!["beta".to_string()]);

    assert!(doc.remove_tool("beta"));
    assert!(doc.dependents_of("alpha").is_empty());
    assert!(!doc.contains_tool("beta"));
}

#[test]
fn numeric_and_blank_fields_round_trip() {
    let (_temp, store) = store_with(
        "tools:\n  a:\n    path: tools/a\n    entrypoint: src/main.py\n    commit: 1234567\n    description:\nexperiment: {}\nvalidation: {}\n",
    );

    let first = store.load().unwrap();
    let record = first.tool("a").unwrap();
    assert_eq!(record.commit, "1234567");
    assert_eq!(record.description, "");
    assert_eq!(record.branch, "main");

    store.save(&first).unwrap();
    let second = store.load().unwrap();
    assert_eq!(second.tool("a"), first.tool("a"));
}

#[test]
fn saving_keeps_sparse_records_sparse() {
    let (_temp, store) = store_with("tools:\n  sparse:\n    path: tools/sparse\n");
    let mut doc = store.load().unwrap();

    doc.upsert_tool(
        "gamma",
        ToolRecord::attached("gamma", "tools/gamma", "main.py"),
    );
    store.save(&doc).unwrap();

    let written = fs::read_to_string(store.path().to_native()).unwrap();
    let value: serde_yaml::Value = serde_yaml::from_str(&written).unwrap();
    let sparse = value["tools"]["sparse"].as_mapping().unwrap();
    assert_eq!(sparse.len(), 1);
    assert_eq!(value["tools"]["gamma"]["commit"].as_str(), Some("HEAD"));
}

#[test]
fn one_bad_record_does_not_spoil_the_document() {
    let (_temp, store) = store_with(
        "tools:\n  good:\n    path: tools/good\n  bad:\n    path: [not, a, path]\n",
    );

    let mut doc = store.load().unwrap();

    assert_eq!(doc.tool_ids(), vec!["good", "bad"]);
    assert!(doc.contains_tool("bad"));
    assert!(doc.tool("bad").is_none());
    let invalid: Vec<_> = doc.invalid_tools().map(|(id, _)| id).collect();
    assert_eq!(invalid, vec!["bad"]);

    // Removing the good one still saves the bad one untouched
    assert!(doc.remove_tool("good"));
    store.save(&doc).unwrap();
    let reloaded = store.load().unwrap();
    assert_eq!(reloaded.tool_ids(), vec!["bad"]);
    assert_eq!(reloaded.invalid_tools().count(), 1);
}
