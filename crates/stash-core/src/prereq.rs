//! Environment checks run before attaching

use stash_git::{CommandRunner, Git};

use crate::settings::StashSettings;
use crate::{Error, Result};

/// A required executable and the version it reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolVersion {
    pub executable: String,
    pub version: String,
}

/// Check every required executable answers `--version` and that the
/// project root is inside a git work tree.
pub fn check_prerequisites<R: CommandRunner>(
    git: &Git<R>,
    settings: &StashSettings,
) -> Result<Vec<ToolVersion>> {
    let mut versions = Vec::new();

    for executable in &settings.required_executables {
        let output = if executable == "git" {
            git.version()
        } else {
            git.runner().run(
                executable,
                &["--version"],
                Some(git.root().to_native().as_path()),
                git.timeout(),
            )
        };
        if !output.succeeded() {
            return Err(Error::environment(format!(
                "{executable} not found: {}",
                output.output
            )));
        }
        tracing::info!(executable, version = %output.output, "prerequisite available");
        versions.push(ToolVersion {
            executable: executable.clone(),
            version: output.output,
        });
    }

    if !git.is_work_tree() {
        return Err(Error::environment(format!(
            "{} is not inside a git repository; run from the project root",
            git.root()
        )));
    }
    Ok(versions)
}
