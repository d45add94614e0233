//! Project context shared by the controllers

use std::path::Path;

use stash_fs::{NormalizedPath, ProjectPath};
use stash_git::index::discover_work_tree;
use stash_git::{CommandRunner, Git, SystemRunner};
use stash_meta::RegistryStore;

use crate::Result;
use crate::settings::StashSettings;

/// A host project: its root, settings and git adapter.
///
/// The attach and detach controllers are methods on this type; every
/// operation loads the registry afresh.
#[derive(Debug, Clone)]
pub struct Stash<R = SystemRunner> {
    root: NormalizedPath,
    settings: StashSettings,
    git: Git<R>,
}

/// The work tree containing `start`, or `start` itself outside git.
pub fn discover_root(start: &Path) -> NormalizedPath {
    match discover_work_tree(start) {
        Ok(root) => root,
        Err(e) => {
            tracing::debug!(start = %start.display(), error = %e, "no enclosing work tree");
            NormalizedPath::new(start)
        }
    }
}

impl Stash<SystemRunner> {
    /// Open a project with settings from `.stash/config.toml` and real processes.
    pub fn open(root: NormalizedPath) -> Result<Self> {
        let settings = StashSettings::load(&root)?;
        Ok(Self::with_runner(root, settings, SystemRunner))
    }
}

impl<R: CommandRunner> Stash<R> {
    pub fn with_runner(root: NormalizedPath, settings: StashSettings, runner: R) -> Self {
        let git = Git::new(runner, root.clone()).with_timeout(settings.command_timeout());
        Self {
            root,
            settings,
            git,
        }
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    pub fn settings(&self) -> &StashSettings {
        &self.settings
    }

    pub fn git(&self) -> &Git<R> {
        &self.git
    }

    pub fn registry(&self) -> RegistryStore {
        RegistryStore::for_project(&self.root)
    }

    /// `tools/<id>` relative to the project root.
    pub fn tool_rel_path(&self, id: &str) -> String {
        format!("{}/{id}", ProjectPath::ToolsDir.as_str())
    }

    /// Absolute path of `tools/<id>`.
    pub fn tool_dir(&self, id: &str) -> NormalizedPath {
        self.root.join(self.tool_rel_path(id))
    }
}
