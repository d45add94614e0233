//! [`TestProject`] builder for host-project scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Minimal registry with all three sections and no tools.
pub const EMPTY_REGISTRY: &str = "tools: {}\nexperiment: {}\nvalidation: {}\n";

/// A temporary host project with helpers for setup and assertion.
///
/// # Example
///
/// ```rust,no_run
/// use stash_test_utils::project::TestProject;
///
/// let project = TestProject::new().with_registry().with_tool("demo");
/// project.assert_file_exists("tools/demo/.git");
/// ```
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    /// Initialise the directory as a real git repository using `git2`.
    pub fn with_git(self) -> Self {
        crate::git::real_git_repo(self.root());
        self
    }

    /// Write an empty `configs/meta.yaml` with all sections.
    pub fn with_registry(self) -> Self {
        self.write("configs/meta.yaml", EMPTY_REGISTRY);
        self
    }

    /// Write `configs/meta.yaml` verbatim.
    pub fn with_registry_yaml(self, yaml: &str) -> Self {
        self.write("configs/meta.yaml", yaml);
        self
    }

    /// Create `tools/<id>/` as an attached unit and register it.
    ///
    /// The registry must already exist; the record is appended under
    /// `tools:` in block style.
    pub fn with_tool(self, id: &str) -> Self {
        self.with_tool_depending_on(id, &[])
    }

    /// Like [`with_tool`](Self::with_tool) with declared dependencies.
    pub fn with_tool_depending_on(self, id: &str, deps: &[&str]) -> Self {
        self.write(&format!("tools/{id}/.git"), "gitdir: ../../.git/modules/x\n");
        self.write(&format!("tools/{id}/src/main.py"), "print('hi')\n");

        let registry = self.read("configs/meta.yaml");
        let deps = if deps.is_empty() {
            "[]".to_string()
        } else {
            format!("[{}]", deps.join(", "))
        };
        let record = format!(
            "  {id}:\n    path: tools/{id}\n    entrypoint: src/main.py\n    commit: HEAD\n    branch: main\n    dependencies: {deps}\n    description: 'Added via plugin: {id}'\n"
        );
        let updated = if registry.contains("tools: {}") {
            registry.replace("tools: {}\n", &format!("tools:\n{record}"))
        } else {
            registry.replacen("tools:\n", &format!("tools:\n{record}"), 1)
        };
        self.write("configs/meta.yaml", &updated);
        self
    }

    /// Write `configs/runs.yaml` verbatim.
    pub fn with_runs(self, yaml: &str) -> Self {
        self.write("configs/runs.yaml", yaml);
        self
    }

    /// Write a file relative to the root, creating parents.
    pub fn with_file(self, rel: &str, content: &str) -> Self {
        self.write(rel, content);
        self
    }

    pub fn write(&self, rel: &str, content: &str) {
        let full_path = self.path(rel);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full_path, content).unwrap();
    }

    /// Read a file relative to the root.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read(&self, rel: &str) -> String {
        let full_path = self.path(rel);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()))
    }

    /// Snapshot of every regular file under the root (relative path, content),
    /// sorted, skipping `.git` internals of the host repository.
    pub fn snapshot(&self) -> Vec<(String, Vec<u8>)> {
        let mut files = Vec::new();
        collect(self.root(), self.root(), &mut files);
        files.sort();
        files
    }

    /// Assert that `path` (relative to the root) exists.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.path(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` (relative to the root) does **not** exist.
    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.path(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` contains `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let file_content = self.read(path);
        assert!(
            file_content.contains(content),
            "File {path} does not contain expected content.\nExpected: {content}\nActual: {file_content}",
        );
    }
}

fn collect(root: &Path, dir: &Path, out: &mut Vec<(String, Vec<u8>)>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        let rel = path
            .strip_prefix(root)
            .unwrap()
            .to_string_lossy()
            .replace('\\', "/");
        if rel == ".git" {
            continue;
        }
        if path.is_dir() {
            collect(root, &path, out);
        } else {
            out.push((rel, fs::read(&path).unwrap()));
        }
    }
}
