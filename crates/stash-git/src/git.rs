//! `git` executable wrapper bound to a project root

use std::time::Duration;

use stash_fs::NormalizedPath;

use crate::runner::{CommandOutput, CommandRunner, DEFAULT_TIMEOUT, SystemRunner};

/// Git invocations rooted at a host project.
///
/// Paths handed to the submodule operations are project-relative
/// (`tools/<id>`); git runs with the project root as its working directory.
#[derive(Debug, Clone)]
pub struct Git<R = SystemRunner> {
    runner: R,
    root: NormalizedPath,
    timeout: Duration,
}

impl Git<SystemRunner> {
    /// Git backed by real processes.
    pub fn system(root: NormalizedPath) -> Self {
        Self::new(SystemRunner, root)
    }
}

impl<R: CommandRunner> Git<R> {
    pub fn new(runner: R, root: NormalizedPath) -> Self {
        Self {
            runner,
            root,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `git <args>` in the project root.
    pub fn run(&self, args: &[&str]) -> CommandOutput {
        self.run_in(&self.root, args)
    }

    /// Run `git <args>` in an arbitrary directory.
    pub fn run_in(&self, dir: &NormalizedPath, args: &[&str]) -> CommandOutput {
        self.runner
            .run("git", args, Some(dir.to_native().as_path()), self.timeout)
    }

    /// `git --version`, trimmed.
    pub fn version(&self) -> CommandOutput {
        self.run(&["--version"])
    }

    /// Whether the project root is inside a git working tree.
    pub fn is_work_tree(&self) -> bool {
        self.run(&["rev-parse", "--git-dir"]).succeeded()
    }

    /// Check out `revision` inside an attached unit.
    pub fn checkout_revision(&self, unit_path: &str, revision: &str) -> CommandOutput {
        let dir = self.root.join(unit_path);
        tracing::info!(path = unit_path, revision, "checking out pinned revision");
        self.run_in(&dir, &["checkout", revision])
    }
}
