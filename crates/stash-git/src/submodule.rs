//! Submodule attach, purge and detach
//!
//! Attaching tolerates two known failure shapes of `git submodule add`.
//! Recovery is an explicit state machine so the policy can be read (and
//! tested) independently of process execution:
//!
//! ```text
//! Initial ──ok──────────────────────────────▶ Attached
//!    │ stale git dir ──▶ ForcedRetry ──ok───▶ Attached
//!    │                       │ staged in index
//!    │ staged in index ──▶ UnstagedRetry ─ok─▶ Attached
//!    └ anything else ──▶ Failed ◀── any other failure
//! ```

use stash_fs::{NormalizedPath, io};

use crate::git::Git;
use crate::runner::{CommandOutput, CommandRunner};
use crate::{Error, Result};

/// States of the attach recovery policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachState {
    /// Plain `submodule add` not yet attempted
    Initial,
    /// Retrying with `--force` after a stale internal git directory
    ForcedRetry,
    /// Retrying the plain command after clearing the index entry
    UnstagedRetry,
    /// Unit attached
    Attached,
    /// No tolerated recovery left
    Failed,
}

/// Recognised shapes of a failed `git submodule add`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureShape {
    /// `.git/modules/<path>` survived an earlier removal
    StaleGitDir,
    /// The path is already staged in the index
    AlreadyStaged,
    /// Anything else
    Other,
}

impl FailureShape {
    pub fn classify(output: &str) -> Self {
        if output.contains("A git directory for") && output.contains("use the '--force' option") {
            Self::StaleGitDir
        } else if output.contains("already exists in the index") {
            Self::AlreadyStaged
        } else {
            Self::Other
        }
    }
}

impl AttachState {
    /// Next state given the outcome of the attempt made in `self`.
    pub fn advance(self, outcome: &CommandOutput) -> Self {
        if self.is_terminal() {
            return self;
        }
        if outcome.succeeded() {
            return Self::Attached;
        }
        match (self, FailureShape::classify(&outcome.output)) {
            (Self::Initial, FailureShape::StaleGitDir) => Self::ForcedRetry,
            (Self::Initial | Self::ForcedRetry, FailureShape::AlreadyStaged) => {
                Self::UnstagedRetry
            }
            _ => Self::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Attached | Self::Failed)
    }
}

/// One `submodule add` invocation.
#[derive(Debug, Clone)]
pub struct AttachAttempt {
    /// State the attempt was made in
    pub state: AttachState,
    pub args: Vec<String>,
    pub outcome: CommandOutput,
}

/// Every attempt made while attaching a unit.
#[derive(Debug, Clone)]
pub struct AttachReport {
    pub path: String,
    pub attempts: Vec<AttachAttempt>,
}

impl AttachReport {
    /// Whether a recovery retry was needed.
    pub fn recovered(&self) -> bool {
        self.attempts.len() > 1
    }
}

/// What the purge step found and removed.
#[derive(Debug, Clone, Default)]
pub struct PurgeReport {
    pub removed_git_marker: bool,
    pub removed_directory: bool,
    /// Index cleanup commands that reported failure; usually harmless
    /// ("did not match any files").
    pub index_failures: Vec<String>,
    /// Filesystem removals that failed
    pub warnings: Vec<String>,
}

/// Failing steps of a best-effort detach.
#[derive(Debug, Clone, Default)]
pub struct DetachReport {
    pub failures: Vec<(String, String)>,
}

impl DetachReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl<R: CommandRunner> Git<R> {
    /// Add `url` as a submodule at `path` tracking `branch`.
    ///
    /// Applies the [`AttachState`] recovery policy; each retry happens at
    /// most once.
    pub fn attach_external_unit(&self, url: &str, branch: &str, path: &str) -> Result<AttachReport> {
        let mut state = AttachState::Initial;
        let mut attempts = Vec::new();

        while !state.is_terminal() {
            if state == AttachState::UnstagedRetry {
                tracing::info!(path, "removing stale index entry and retrying");
                self.clear_index_entries(path);
            }

            let mut args = vec!["submodule", "add"];
            if state == AttachState::ForcedRetry {
                tracing::info!(path, "retrying submodule add with --force");
                args.push("--force");
            }
            args.extend(["-b", branch, url, path]);

            let outcome = self.run(&args);
            let next = state.advance(&outcome);
            tracing::debug!(path, from = ?state, to = ?next, "attach transition");

            attempts.push(AttachAttempt {
                state,
                args: args.iter().map(|a| a.to_string()).collect(),
                outcome,
            });
            state = next;
        }

        if state == AttachState::Failed {
            let message = attempts
                .last()
                .map(|a| a.outcome.output.clone())
                .unwrap_or_default();
            return Err(Error::SubmoduleAddFailed {
                path: path.to_string(),
                attempts: attempts.len(),
                message,
            });
        }

        tracing::info!(path, attempts = attempts.len(), "submodule added");
        Ok(AttachReport {
            path: path.to_string(),
            attempts,
        })
    }

    /// Remove every trace of a previous attach attempt at `path`.
    ///
    /// Deletes `<path>/.git`, the working-tree directory and any index
    /// entries for the path. Safe to run repeatedly.
    pub fn purge_stale_state(&self, path: &str) -> PurgeReport {
        let mut report = PurgeReport::default();
        let unit_dir: NormalizedPath = self.root().join(path);

        match io::remove_dir_if_exists(&unit_dir.join(".git")) {
            Ok(removed) => report.removed_git_marker = removed,
            Err(e) => report.warnings.push(e.to_string()),
        }
        match io::remove_dir_if_exists(&unit_dir) {
            Ok(removed) => report.removed_directory = removed,
            Err(e) => report.warnings.push(e.to_string()),
        }
        if report.removed_git_marker || report.removed_directory {
            tracing::info!(path, "removed leftover working tree");
        }

        report.index_failures = self.clear_index_entries(path);
        for warning in &report.warnings {
            tracing::warn!(path, %warning, "purge could not remove leftover state");
        }
        report
    }

    /// `git submodule deinit -f` followed by `git rm -f`.
    ///
    /// Failures are collected, never returned as errors.
    pub fn detach_external_unit(&self, path: &str) -> DetachReport {
        let mut report = DetachReport::default();

        let steps: [(&str, Vec<&str>); 2] = [
            ("deinit", vec!["submodule", "deinit", "-f", path]),
            ("rm", vec!["rm", "-f", path]),
        ];
        for (step, args) in steps {
            let outcome = self.run(&args);
            if !outcome.succeeded() {
                tracing::warn!(path, step, output = %outcome.output, "submodule detach step failed");
                report.failures.push((step.to_string(), outcome.output));
            }
        }
        report
    }

    /// Unstage `path` from the index; returns outputs of commands that failed.
    fn clear_index_entries(&self, path: &str) -> Vec<String> {
        let commands: [&[&str]; 3] = [
            &["rm", "--cached", path],
            &["reset", "HEAD", path],
            &["rm", "-r", "--cached", path],
        ];
        commands
            .iter()
            .map(|args| self.run(args))
            .filter(|outcome| !outcome.succeeded())
            .map(|outcome| outcome.output)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const STALE: &str = "fatal: A git directory for 'tools/demo' is found locally with remote(s):\n  origin\nIf you want to reuse this local git directory instead of cloning again from\nuse the '--force' option.";
    const STAGED: &str = "fatal: 'tools/demo' already exists in the index";

    fn ok() -> CommandOutput {
        CommandOutput::success("")
    }

    fn fail(msg: &str) -> CommandOutput {
        CommandOutput::failure(Some(128), msg)
    }

    #[rstest]
    #[case(STALE, FailureShape::StaleGitDir)]
    #[case(STAGED, FailureShape::AlreadyStaged)]
    #[case("fatal: repository not found", FailureShape::Other)]
    #[case("Command timed out after 300 seconds", FailureShape::Other)]
    // Both markers are needed for the stale shape
    #[case("A git directory for 'x' is found locally", FailureShape::Other)]
    fn classifies_failures(#[case] output: &str, #[case] expected: FailureShape) {
        assert_eq!(FailureShape::classify(output), expected);
    }

    #[rstest]
    #[case(AttachState::Initial, ok(), AttachState::Attached)]
    #[case(AttachState::Initial, fail(STALE), AttachState::ForcedRetry)]
    #[case(AttachState::Initial, fail(STAGED), AttachState::UnstagedRetry)]
    #[case(AttachState::Initial, fail("boom"), AttachState::Failed)]
    #[case(AttachState::ForcedRetry, ok(), AttachState::Attached)]
    #[case(AttachState::ForcedRetry, fail(STAGED), AttachState::UnstagedRetry)]
    #[case(AttachState::ForcedRetry, fail(STALE), AttachState::Failed)]
    #[case(AttachState::ForcedRetry, fail("boom"), AttachState::Failed)]
    #[case(AttachState::UnstagedRetry, ok(), AttachState::Attached)]
    #[case(AttachState::UnstagedRetry, fail(STAGED), AttachState::Failed)]
    #[case(AttachState::UnstagedRetry, fail(STALE), AttachState::Failed)]
    #[case(AttachState::Attached, fail("boom"), AttachState::Attached)]
    #[case(AttachState::Failed, ok(), AttachState::Failed)]
    fn transition_table(
        #[case] from: AttachState,
        #[case] outcome: CommandOutput,
        #[case] expected: AttachState,
    ) {
        assert_eq!(from.advance(&outcome), expected);
    }

    #[test]
    fn timeout_is_not_recoverable() {
        let timeout = CommandOutput::timed_out(std::time::Duration::from_secs(300));
        assert_eq!(AttachState::Initial.advance(&timeout), AttachState::Failed);
    }
}
