//! Git repository fixtures at two realism levels.
//!
//! Choose the lowest-realism fixture that satisfies the test. Attach flows
//! are normally driven through [`crate::runner::FakeRunner`] instead of a
//! real remote.

use std::fs;
use std::path::Path;
use std::process::Command;

/// Initialises a real git repository using `git2` (no initial commit, no config).
///
/// Realism level: **REAL**: valid git object store, empty history.
///
/// # Panics
/// Panics if `git2::Repository::init` fails.
pub fn real_git_repo(path: &Path) -> git2::Repository {
    git2::Repository::init(path).unwrap_or_else(|e| {
        panic!(
            "real_git_repo: failed to init repository at {}: {e}",
            path.display()
        )
    })
}

/// Initialises a real git repository with an initial commit using the `git` CLI.
///
/// Realism level: **REAL WITH HISTORY**: `main` branch, one commit.
///
/// # Panics
/// Panics if any git operation fails.
pub fn real_git_repo_with_commit(path: &Path) {
    run_git(path, &["init"]);
    run_git(path, &["config", "user.email", "test@test.com"]);
    run_git(path, &["config", "user.name", "Test User"]);
    run_git(path, &["config", "commit.gpgsign", "false"]);

    fs::write(path.join("README.md"), "# Test")
        .unwrap_or_else(|e| panic!("real_git_repo_with_commit: failed to write README.md: {e}"));

    run_git(path, &["add", "."]);
    run_git(path, &["commit", "-m", "Initial commit"]);
    // Older git versions may not support this flag
    let _ = Command::new("git")
        .args(["branch", "-m", "main"])
        .current_dir(path)
        .output();
}

/// Stage a file so the index holds an entry below `rel`.
///
/// # Panics
/// Panics if the file cannot be written or staged.
pub fn stage_file(repo_root: &Path, rel: &str, content: &str) {
    let file = repo_root.join(rel);
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent).unwrap_or_else(|e| panic!("stage_file: {e}"));
    }
    fs::write(&file, content).unwrap_or_else(|e| panic!("stage_file: {e}"));
    run_git(repo_root, &["add", "--", rel]);
}

/// Run `git <args>` and panic on failure.
pub fn run_git(path: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(path)
        .output()
        .unwrap_or_else(|e| panic!("failed to run `git {args:?}`: {e}"));
    if !output.status.success() {
        panic!(
            "`git {args:?}` failed:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
}
