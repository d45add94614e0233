//! Scans for configuration documents that reference a tool

use std::fs;
use std::path::Path;

use stash_fs::{NormalizedPath, ProjectPath, io};
use stash_meta::experiment::referenced_tool;

/// Documents under `configs/` (recursive) whose `tool` is `id`.
///
/// Paths are relative to `configs/` and sorted. The registry and any
/// unreadable document are skipped.
pub fn config_references(root: &NormalizedPath, id: &str) -> Vec<String> {
    let configs_dir = root.join(ProjectPath::ConfigsDir);
    let registry = root.join(ProjectPath::Registry);

    let mut documents = Vec::new();
    collect_yaml(&configs_dir.to_native(), &mut documents);

    let mut references: Vec<String> = documents
        .into_iter()
        .map(NormalizedPath::new)
        .filter(|path| *path != registry)
        .filter(|path| {
            io::read_text(path)
                .ok()
                .and_then(|content| referenced_tool(&content))
                .is_some_and(|tool| tool == id)
        })
        .filter_map(|path| path.relative_to(&configs_dir))
        .map(|path| path.as_str().to_string())
        .collect();
    references.sort();

    tracing::debug!(id, count = references.len(), "config usage scan");
    references
}

fn collect_yaml(dir: &Path, out: &mut Vec<std::path::PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_yaml(&path, out);
        } else if path
            .extension()
            .is_some_and(|ext| ext == "yaml" || ext == "yml")
        {
            out.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn finds_nested_references_and_skips_registry() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "configs/meta.yaml", "tool: demo\n");
        write(temp.path(), "configs/example_demo.yaml", "tool: demo\n");
        write(temp.path(), "configs/sweep/fast.yml", "tool: demo\n");
        write(temp.path(), "configs/other.yaml", "tool: other\n");
        write(temp.path(), "configs/broken.yaml", "tool: [unclosed\n");
        write(temp.path(), "configs/notes.txt", "tool: demo\n");

        let refs = config_references(&NormalizedPath::new(temp.path()), "demo");
        assert_eq!(refs, vec!["example_demo.yaml", "sweep/fast.yml"]);
    }

    #[test]
    fn missing_configs_dir_is_empty() {
        let temp = TempDir::new().unwrap();
        assert!(config_references(&NormalizedPath::new(temp.path()), "demo").is_empty());
    }
}
