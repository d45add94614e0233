//! Attach controller
//!
//! Adds a tool repository as a submodule under `tools/<id>/` and brings the
//! registry, ignore list and example configuration in line with it. Input
//! validation, prerequisites, purge, the submodule add itself and the
//! registry write are fatal; everything after the unit is in place only
//! warns. Nothing is rolled back.

use stash_fs::{NormalizedPath, validate_identifier};
use stash_git::CommandRunner;
use stash_git::index::has_index_entry;
use stash_meta::ToolRecord;
use stash_meta::tools::HEAD_REVISION;

use crate::entrypoint::{self, EntryReference};
use crate::ignore::{IgnoreChange, IgnoreList};
use crate::outcome::{Outcomes, StepOutcome};
use crate::prereq::check_prerequisites;
use crate::scaffold::write_example_config;
use crate::stash::Stash;
use crate::validate::{ValidationMode, ValidationReport, Validator};
use crate::{Error, Result};

/// Parameters of one attach.
#[derive(Debug, Clone)]
pub struct AttachRequest {
    pub identifier: String,
    pub source_url: String,
    /// Tracked branch; the settings' default branch when `None`
    pub branch: Option<String>,
    /// Used only when no entrypoint candidate is found in the clone
    pub entrypoint: Option<String>,
    pub skip_validation: bool,
    /// Add `tools/<id>/` to `.gitignore`
    pub manage_ignore: bool,
    pub skip_prereqs: bool,
    /// Revision to check out and record instead of `HEAD`
    pub pin: Option<String>,
    /// Run `uv sync` in the tool after cloning
    pub sync_env: bool,
}

impl AttachRequest {
    pub fn new(identifier: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            source_url: source_url.into(),
            branch: None,
            entrypoint: None,
            skip_validation: false,
            manage_ignore: true,
            skip_prereqs: false,
            pin: None,
            sync_env: false,
        }
    }
}

/// Result of a completed attach.
#[derive(Debug, Clone)]
pub struct AttachSummary {
    pub identifier: String,
    /// Project-relative tool root, `tools/<id>`
    pub root_path: String,
    pub entry_reference: EntryReference,
    /// Recorded revision: `HEAD` or the pinned one
    pub commit: String,
    pub outcomes: Outcomes,
    /// Reduced validation run after attaching, unless skipped
    pub validation: Option<ValidationReport>,
}

impl<R: CommandRunner> Stash<R> {
    /// Attach a tool repository.
    pub fn attach(&self, request: &AttachRequest) -> Result<AttachSummary> {
        let id = request.identifier.as_str();
        let rel_path = self.tool_rel_path(id);
        let tool_dir = self.tool_dir(id);
        let branch = request
            .branch
            .clone()
            .unwrap_or_else(|| self.settings().default_branch.clone());
        let mut outcomes = Outcomes::new();

        tracing::info!(id, url = %request.source_url, branch = %branch, "attaching tool");

        outcomes.record("input", self.check_attach_input(request, &tool_dir))?;

        if request.skip_prereqs {
            outcomes.ok("prerequisites", "Skipped prerequisite checks");
        } else {
            outcomes.record("prerequisites", self.prerequisites_step())?;
        }

        outcomes.record("purge", self.purge_step(&rel_path))?;
        outcomes.record("submodule", self.submodule_step(request, &branch, &rel_path))?;

        let mut commit = HEAD_REVISION.to_string();
        if let Some(revision) = &request.pin {
            let output = self.git().checkout_revision(&rel_path, revision);
            if output.succeeded() {
                commit = revision.clone();
                outcomes.ok("pin", format!("Pinned {id} to {revision}"));
            } else {
                outcomes.warn(
                    "pin",
                    format!("Could not check out {revision}, tracking {HEAD_REVISION}: {}", output.output),
                );
            }
        }

        if request.sync_env {
            outcomes.record("sync-env", self.sync_env_step(&tool_dir))?;
        }

        let entry = entrypoint::resolve_or(&tool_dir, request.entrypoint.as_deref());
        outcomes.ok("entrypoint", format!("Using entrypoint: {entry}"));

        let record = ToolRecord::attached(id, rel_path.as_str(), entry.to_string())
            .with_branch(branch.as_str())
            .with_commit(commit.as_str());
        outcomes.record(
            "registry",
            StepOutcome::from_result(self.register(id, record)),
        )?;

        if request.manage_ignore {
            let result = IgnoreList::for_project(self.root())
                .add_tool(id)
                .map(|change| match change {
                    IgnoreChange::Created => format!("Created .gitignore with tools/{id}/"),
                    IgnoreChange::Unchanged => format!("tools/{id}/ already ignored"),
                    _ => format!("Added tools/{id}/ to .gitignore"),
                });
            outcomes.record("ignore", StepOutcome::tolerate(result))?;
        }

        for outcome in post_attach_checks(id, &tool_dir) {
            outcomes.record("post-check", outcome)?;
        }

        let scaffold = write_example_config(self.root(), id).map(|path| {
            let shown = path
                .relative_to(self.root())
                .unwrap_or_else(|| path.clone());
            format!("Created example config: {shown}")
        });
        outcomes.record("scaffold", StepOutcome::tolerate(scaffold))?;

        let validation = if request.skip_validation {
            None
        } else {
            let report = Validator::new(self.root().clone(), ValidationMode::Reduced).run();
            if report.findings.is_empty() {
                outcomes.ok("validation", "Configuration is consistent");
            }
            for finding in &report.findings {
                outcomes.warn("validation", finding.message.clone());
            }
            Some(report)
        };

        tracing::info!(id, path = %rel_path, "tool attached");
        Ok(AttachSummary {
            identifier: id.to_string(),
            root_path: rel_path,
            entry_reference: entry,
            commit,
            outcomes,
            validation,
        })
    }

    fn check_attach_input(&self, request: &AttachRequest, tool_dir: &NormalizedPath) -> StepOutcome {
        let id = request.identifier.as_str();
        if let Err(message) = validate_identifier(id) {
            return StepOutcome::Fatal(Error::invalid_input(message));
        }
        if !self.settings().accepts_url(&request.source_url) {
            return StepOutcome::Fatal(Error::invalid_input(format!(
                "Unsupported source URL '{}' (expected a URL starting with {})",
                request.source_url,
                self.settings().accepted_url_prefixes.join(" or ")
            )));
        }
        if tool_dir.exists() {
            return StepOutcome::Fatal(Error::invalid_input(format!(
                "Tool {id} already exists at {}",
                self.tool_rel_path(id)
            )));
        }
        StepOutcome::ok(format!("Input accepted for {id}"))
    }

    fn prerequisites_step(&self) -> StepOutcome {
        let versions = check_prerequisites(self.git(), self.settings()).map(|versions| {
            versions
                .iter()
                .map(|v| v.version.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        });
        StepOutcome::from_result(versions)
    }

    fn purge_step(&self, rel_path: &str) -> StepOutcome {
        let report = self.git().purge_stale_state(rel_path);

        match has_index_entry(&self.root().to_native(), rel_path) {
            Ok(true) => tracing::warn!(path = rel_path, "index still has entries after purge"),
            Ok(false) => tracing::debug!(path = rel_path, "index clean"),
            Err(e) => tracing::debug!(path = rel_path, error = %e, "index not inspected"),
        }

        if report.warnings.is_empty() {
            StepOutcome::ok(format!("Cleared leftover state at {rel_path}"))
        } else {
            StepOutcome::warning(report.warnings.join("; "))
        }
    }

    fn submodule_step(&self, request: &AttachRequest, branch: &str, rel_path: &str) -> StepOutcome {
        match self
            .git()
            .attach_external_unit(&request.source_url, branch, rel_path)
        {
            Ok(report) if report.recovered() => StepOutcome::ok(format!(
                "Added submodule at {rel_path} after {} attempts",
                report.attempts.len()
            )),
            Ok(_) => StepOutcome::ok(format!("Added submodule at {rel_path}")),
            Err(e) => StepOutcome::Fatal(Error::AttachFailed {
                identifier: request.identifier.clone(),
                message: e.to_string(),
            }),
        }
    }

    fn sync_env_step(&self, tool_dir: &NormalizedPath) -> StepOutcome {
        if !tool_dir.join("pyproject.toml").is_file() {
            return StepOutcome::warning("No pyproject.toml, skipped environment sync");
        }
        let output = self.git().runner().run(
            "uv",
            &["sync"],
            Some(tool_dir.to_native().as_path()),
            self.git().timeout(),
        );
        if output.succeeded() {
            StepOutcome::ok("Environment synced")
        } else {
            StepOutcome::warning(format!("uv sync failed: {}", output.output))
        }
    }

    fn register(&self, id: &str, record: ToolRecord) -> Result<String> {
        let store = self.registry();
        let mut doc = store.load()?;
        doc.upsert_tool(id, record);
        store.save(&doc)?;
        Ok(format!("Registered {id} in {}", store.path()))
    }
}

/// Checks on the freshly cloned unit.
fn post_attach_checks(id: &str, tool_dir: &NormalizedPath) -> Vec<StepOutcome> {
    if !tool_dir.is_dir() {
        return vec![StepOutcome::Fatal(Error::AttachFailed {
            identifier: id.to_string(),
            message: format!("Tool directory missing after attach: {tool_dir}"),
        })];
    }

    let mut outcomes = Vec::new();
    if !tool_dir.join("pyproject.toml").is_file() {
        outcomes.push(StepOutcome::warning("No pyproject.toml found"));
    }
    if !tool_dir.join("uv.lock").is_file() {
        outcomes.push(StepOutcome::warning(format!(
            "No uv.lock found. You may need to run: cd {tool_dir} && uv sync"
        )));
    }
    if !tool_dir.join("src").is_dir() {
        outcomes.push(StepOutcome::warning("No src/ directory found"));
    }
    if outcomes.is_empty() {
        outcomes.push(StepOutcome::ok("Tool layout looks complete"));
    }
    outcomes
}
