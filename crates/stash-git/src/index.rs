//! Read-only index inspection through libgit2

use std::path::Path;

use git2::Repository;
use stash_fs::NormalizedPath;

use crate::{Error, Result};

/// Locate the working tree containing `path`.
pub fn discover_work_tree(path: &Path) -> Result<NormalizedPath> {
    let repo = Repository::discover(path).map_err(|_| Error::NotARepository {
        path: path.to_path_buf(),
    })?;
    let workdir = repo.workdir().ok_or_else(|| Error::NotARepository {
        path: path.to_path_buf(),
    })?;
    Ok(NormalizedPath::new(workdir))
}

/// Whether the index holds `path` itself (a gitlink) or anything below it.
pub fn has_index_entry(repo_root: &Path, path: &str) -> Result<bool> {
    let repo = Repository::open(repo_root)?;
    let index = repo.index()?;
    let prefix = format!("{}/", path.trim_end_matches('/'));
    let exact = path.trim_end_matches('/');

    Ok(index.iter().any(|entry| {
        let entry_path = String::from_utf8_lossy(&entry.path);
        entry_path == exact || entry_path.starts_with(&prefix)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn repo_with_file(rel: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        let file = temp.path().join(rel);
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, "x").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(rel)).unwrap();
        index.write().unwrap();
        temp
    }

    #[test]
    fn finds_entries_under_directory() {
        let temp = repo_with_file("tools/demo/main.py");
        assert!(has_index_entry(temp.path(), "tools/demo").unwrap());
        assert!(has_index_entry(temp.path(), "tools/demo/").unwrap());
    }

    #[test]
    fn sibling_prefix_does_not_match() {
        let temp = repo_with_file("tools/demo-two/main.py");
        assert!(!has_index_entry(temp.path(), "tools/demo").unwrap());
    }

    #[test]
    fn discover_from_subdirectory() {
        let temp = repo_with_file("tools/demo/main.py");
        let root = discover_work_tree(&temp.path().join("tools/demo")).unwrap();
        let expected = NormalizedPath::new(temp.path().canonicalize().unwrap());
        assert_eq!(
            NormalizedPath::new(root.to_native().canonicalize().unwrap()),
            expected
        );
    }

    #[test]
    fn discover_outside_repo_fails() {
        let temp = TempDir::new().unwrap();
        let err = discover_work_tree(temp.path()).unwrap_err();
        assert!(matches!(err, Error::NotARepository { .. }));
    }
}
