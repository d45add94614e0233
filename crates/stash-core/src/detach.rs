//! Detach controller
//!
//! Removes a tool from the project: registry record, ignore entry,
//! submodule, working tree and example configs. A backup is taken before
//! anything is mutated; once removal starts every step is best-effort.

use stash_fs::{NormalizedPath, ProjectPath, io};
use stash_git::CommandRunner;
use stash_meta::RunDefinitions;

use crate::backup::BackupManager;
use crate::ignore::{IgnoreChange, IgnoreList, tool_pattern};
use crate::outcome::{Outcomes, StepOutcome};
use crate::scaffold::example_config_paths;
use crate::stash::Stash;
use crate::usage::config_references;
use crate::{Error, Result};

/// Parameters of one detach.
#[derive(Debug, Clone, Default)]
pub struct DetachRequest {
    pub identifier: String,
    /// Report what would happen without touching anything
    pub dry_run: bool,
    /// Skip the confirmation prompt
    pub force: bool,
    pub no_backup: bool,
    /// Do not warn about configs that still reference the tool
    pub keep_configs: bool,
    /// Leave the `.gitignore` entry in place
    pub keep_ignore: bool,
}

impl DetachRequest {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Self::default()
        }
    }
}

/// What a detach will affect, shown before confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetachPlan {
    pub identifier: String,
    /// Project-relative tool root
    pub root_path: String,
    /// Documents under `configs/` whose `tool` is this identifier
    pub config_references: Vec<String>,
    /// Named runs in `configs/runs.yaml` that use this tool
    pub run_references: Vec<String>,
    /// Registered tools that declare this one as a dependency
    pub dependents: Vec<String>,
}

/// Asks whether a planned detach should go ahead.
pub trait Confirmation {
    fn confirm(&self, plan: &DetachPlan) -> bool;
}

impl<F> Confirmation for F
where
    F: Fn(&DetachPlan) -> bool,
{
    fn confirm(&self, plan: &DetachPlan) -> bool {
        self(plan)
    }
}

/// Result of a completed (or simulated) detach.
#[derive(Debug, Clone)]
pub struct DetachSummary {
    pub identifier: String,
    pub dry_run: bool,
    pub plan: DetachPlan,
    pub backup: Option<NormalizedPath>,
    pub outcomes: Outcomes,
}

impl<R: CommandRunner> Stash<R> {
    /// Detach a tool, asking `confirmation` unless forced or dry-running.
    pub fn detach(
        &self,
        request: &DetachRequest,
        confirmation: &dyn Confirmation,
    ) -> Result<DetachSummary> {
        let id = request.identifier.as_str();
        let rel_path = self.tool_rel_path(id);
        let tool_dir = self.tool_dir(id);
        let mut outcomes = Outcomes::new();

        tracing::info!(id, dry_run = request.dry_run, "detaching tool");

        outcomes.record("locate", self.locate_unit(id, &rel_path, &tool_dir))?;

        let references = config_references(self.root(), id);
        if references.is_empty() {
            outcomes.ok("usage", format!("No configs reference {id}"));
        } else {
            outcomes.ok(
                "usage",
                format!("{} config(s) reference {id}", references.len()),
            );
        }

        let run_references = self.run_references(id);
        if !run_references.is_empty() {
            outcomes.ok(
                "usage",
                format!("Runs using {id}: {}", run_references.join(", ")),
            );
        }

        let dependents = match self.registry().load() {
            Ok(doc) => doc.dependents_of(id),
            Err(e) => {
                outcomes.warn("dependencies", format!("Could not read registry: {e}"));
                Vec::new()
            }
        };
        if !dependents.is_empty() {
            outcomes.warn(
                "dependencies",
                format!("Tools depending on {id}: {}", dependents.join(", ")),
            );
        }

        let plan = DetachPlan {
            identifier: id.to_string(),
            root_path: rel_path.clone(),
            config_references: references,
            run_references,
            dependents,
        };

        if request.dry_run {
            self.describe_plan(request, &plan, &mut outcomes);
            return Ok(DetachSummary {
                identifier: id.to_string(),
                dry_run: true,
                plan,
                backup: None,
                outcomes,
            });
        }

        if !request.force && !confirmation.confirm(&plan) {
            tracing::info!(id, "detach declined");
            return Err(Error::Cancelled);
        }

        let mut backup = None;
        if request.no_backup {
            outcomes.ok("backup", "Skipped backup");
        } else {
            let created = BackupManager::new(self.root(), &self.settings().backups_dir)
                .create_backup(id, &tool_dir)?;
            outcomes.ok(
                "backup",
                format!("Backed up {rel_path} ({} files) to {}", created.files, created.path),
            );
            backup = Some(created.path);
        }

        outcomes.record("registry", self.unregister(id))?;

        if request.keep_ignore {
            outcomes.ok("ignore", "Kept .gitignore entry");
        } else {
            let result = IgnoreList::for_project(self.root())
                .remove_tool(id)
                .map(|change| match change {
                    IgnoreChange::Removed => format!("Removed {} from .gitignore", tool_pattern(id)),
                    _ => format!("{} was not in .gitignore", tool_pattern(id)),
                });
            outcomes.record("ignore", StepOutcome::tolerate(result))?;
        }

        let report = self.git().detach_external_unit(&rel_path);
        for (step, output) in &report.failures {
            outcomes.warn("submodule", format!("git {step} failed: {output}"));
        }
        if report.is_clean() {
            outcomes.ok("submodule", format!("Removed submodule {rel_path}"));
        }

        let removal = io::remove_dir_if_exists(&tool_dir)
            .map(|_| format!("Deleted {rel_path}"))
            .map_err(Error::from);
        outcomes.record("directory", StepOutcome::tolerate(removal))?;

        for path in example_config_paths(self.root(), id) {
            match io::remove_file_if_exists(&path) {
                Ok(true) => outcomes.ok("examples", format!("Removed {path}")),
                Ok(false) => {}
                Err(e) => outcomes.warn("examples", e.to_string()),
            }
        }

        if !request.keep_configs {
            for warning in leftover_references(&plan) {
                outcomes.warn("configs", warning);
            }
        }

        tracing::info!(id, "tool detached");
        Ok(DetachSummary {
            identifier: id.to_string(),
            dry_run: false,
            plan,
            backup,
            outcomes,
        })
    }

    fn locate_unit(&self, id: &str, rel_path: &str, tool_dir: &NormalizedPath) -> StepOutcome {
        if !tool_dir.is_dir() {
            return StepOutcome::Fatal(Error::NotFound {
                identifier: id.to_string(),
                path: rel_path.to_string(),
            });
        }
        if !tool_dir.join(ProjectPath::GitDir).exists() {
            return StepOutcome::Fatal(Error::NotATrackedUnit {
                identifier: id.to_string(),
            });
        }
        StepOutcome::ok(format!("Found {id} at {rel_path}"))
    }

    /// Runs using `id`; an absent or unreadable runs document has none.
    fn run_references(&self, id: &str) -> Vec<String> {
        match RunDefinitions::load(&self.root().join(ProjectPath::Runs)) {
            Ok(runs) => runs.using_tool(id).map(str::to_string).collect(),
            Err(e) => {
                tracing::debug!(error = %e, "run definitions not scanned");
                Vec::new()
            }
        }
    }

    fn unregister(&self, id: &str) -> StepOutcome {
        let store = self.registry();
        let mut doc = match store.load() {
            Ok(doc) => doc,
            Err(e) => return StepOutcome::warning(format!("Registry not updated: {e}")),
        };
        if !doc.remove_tool(id) {
            return StepOutcome::ok(format!("{id} was not registered"));
        }
        match store.save(&doc) {
            Ok(()) => StepOutcome::ok(format!("Removed {id} from {}", store.path())),
            Err(e) => StepOutcome::Fatal(e.into()),
        }
    }

    fn describe_plan(&self, request: &DetachRequest, plan: &DetachPlan, outcomes: &mut Outcomes) {
        let id = plan.identifier.as_str();
        let mut actions = Vec::new();

        if !request.no_backup {
            let backups = BackupManager::new(self.root(), &self.settings().backups_dir);
            actions.push(format!(
                "Would back up {} to {}/{id}_<timestamp>",
                plan.root_path,
                backups.backups_dir()
            ));
        }
        actions.push(format!("Would remove {id} from {}", ProjectPath::Registry.as_str()));
        if !request.keep_ignore {
            actions.push(format!("Would remove {} from .gitignore", tool_pattern(id)));
        }
        actions.push(format!("Would deinit and remove submodule {}", plan.root_path));
        actions.push(format!("Would delete {}", plan.root_path));
        for path in example_config_paths(self.root(), id) {
            if path.exists() {
                actions.push(format!("Would remove {path}"));
            }
        }

        for action in actions {
            outcomes.ok("dry-run", action);
        }
        if !request.keep_configs {
            for warning in leftover_references(plan) {
                outcomes.warn("configs", warning);
            }
        }
    }
}

/// References that survive a detach: configs other than the tool's own
/// examples, and runs that name the tool.
fn leftover_references(plan: &DetachPlan) -> Vec<String> {
    let id = plan.identifier.as_str();
    let examples = [format!("example_{id}.yaml"), format!("example_{id}.yml")];
    let remaining: Vec<&str> = plan
        .config_references
        .iter()
        .filter(|config| !examples.contains(config))
        .map(String::as_str)
        .collect();

    let mut warnings = Vec::new();
    if !remaining.is_empty() {
        warnings.push(format!("Configs still reference {id}: {}", remaining.join(", ")));
    }
    if !plan.run_references.is_empty() {
        warnings.push(format!(
            "Runs in {} still use {id}: {}",
            ProjectPath::Runs.as_str(),
            plan.run_references.join(", ")
        ));
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> DetachPlan {
        DetachPlan {
            identifier: "demo".into(),
            root_path: "tools/demo".into(),
            config_references: vec!["example_demo.yaml".into()],
            run_references: Vec::new(),
            dependents: Vec::new(),
        }
    }

    #[test]
    fn closures_confirm() {
        let yes = |_: &DetachPlan| true;
        let no = |plan: &DetachPlan| plan.config_references.is_empty();
        assert!(yes.confirm(&plan()));
        assert!(!no.confirm(&plan()));
    }

    #[test]
    fn request_defaults_are_cautious() {
        let request = DetachRequest::new("demo");
        assert_eq!(request.identifier, "demo");
        assert!(!request.dry_run);
        assert!(!request.force);
        assert!(!request.no_backup);
    }
}
