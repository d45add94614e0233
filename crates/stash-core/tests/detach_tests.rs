//! Detach flows against a scripted runner

use std::fs;

use pretty_assertions::assert_eq;
use stash_core::{DetachPlan, DetachRequest, Error, OutcomeLevel, Stash, StashSettings};
use stash_fs::NormalizedPath;
use stash_git::CommandOutput;
use stash_meta::RegistryStore;
use stash_test_utils::project::TestProject;
use stash_test_utils::runner::FakeRunner;

fn stash(project: &TestProject, runner: FakeRunner) -> Stash<FakeRunner> {
    Stash::with_runner(
        NormalizedPath::new(project.root()),
        StashSettings::default(),
        runner,
    )
}

fn attached_project() -> TestProject {
    TestProject::new()
        .with_registry()
        .with_tool("demo")
        .with_file(".gitignore", "venv/\n\n# Tools\ntools/demo/\n")
        .with_file("configs/example_demo.yaml", "tool: demo\n")
}

fn forced(id: &str) -> DetachRequest {
    DetachRequest {
        force: true,
        ..DetachRequest::new(id)
    }
}

fn never(_: &DetachPlan) -> bool {
    panic!("confirmation must not be asked")
}

#[test]
fn ghost_tool_is_not_found() {
    let project = TestProject::new().with_registry();
    let before = project.snapshot();
    let stash = stash(&project, FakeRunner::new());

    let err = stash.detach(&forced("ghost-tool"), &never).unwrap_err();

    match err {
        Error::NotFound { identifier, path } => {
            assert_eq!(identifier, "ghost-tool");
            assert_eq!(path, "tools/ghost-tool");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(project.snapshot(), before);
}

#[test]
fn plain_directory_is_not_a_tracked_unit() {
    let project = TestProject::new()
        .with_registry()
        .with_file("tools/loose/readme.md", "hi\n");
    let stash = stash(&project, FakeRunner::new());

    let err = stash.detach(&forced("loose"), &never).unwrap_err();

    assert!(matches!(err, Error::NotATrackedUnit { .. }));
    project.assert_file_exists("tools/loose/readme.md");
}

#[test]
fn dry_run_changes_nothing() {
    let project = attached_project();
    let before = project.snapshot();
    let stash = stash(&project, FakeRunner::new());
    let request = DetachRequest {
        dry_run: true,
        ..DetachRequest::new("demo")
    };

    let summary = stash.detach(&request, &never).unwrap();

    assert!(summary.dry_run);
    assert!(summary.backup.is_none());
    assert_eq!(project.snapshot(), before);
    assert!(stash.git().runner().calls().is_empty());

    let actions: Vec<_> = summary
        .outcomes
        .for_step("dry-run")
        .into_iter()
        .map(|r| r.message.clone())
        .collect();
    assert!(actions.iter().any(|a| a == "Would delete tools/demo"));
    assert!(actions.iter().any(|a| a == "Would remove tools/demo/ from .gitignore"));
}

#[test]
fn dry_run_reports_leftover_references() {
    let project = attached_project()
        .with_file("configs/sweeps/fast.yaml", "tool: demo\n")
        .with_runs("runs:\n  fast:\n    tool: demo\n    config: fast\n");
    let before = project.snapshot();
    let stash = stash(&project, FakeRunner::new());
    let request = DetachRequest {
        dry_run: true,
        ..DetachRequest::new("demo")
    };

    let summary = stash.detach(&request, &never).unwrap();

    let warnings: Vec<_> = summary
        .outcomes
        .for_step("configs")
        .into_iter()
        .map(|r| r.message.clone())
        .collect();
    assert_eq!(
        warnings,
        vec![
            "Configs still reference demo: sweeps/fast.yaml".to_string(),
            "Runs in configs/runs.yaml still use demo: fast".to_string(),
        ]
    );
    assert_eq!(project.snapshot(), before);
}

#[test]
fn declined_confirmation_cancels() {
    let project = attached_project();
    let before = project.snapshot();
    let stash = stash(&project, FakeRunner::new());

    let err = stash
        .detach(&DetachRequest::new("demo"), &|_: &DetachPlan| false)
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled));
    assert_eq!(project.snapshot(), before);
}

#[test]
fn confirmation_sees_the_plan() {
    let project = attached_project()
        .with_tool_depending_on("consumer", &["demo"])
        .with_file("configs/sweeps/fast.yaml", "tool: demo\n");
    let stash = stash(&project, FakeRunner::new());

    let confirm = |plan: &DetachPlan| {
        assert_eq!(plan.root_path, "tools/demo");
        assert_eq!(plan.dependents, vec!["consumer"]);
        assert_eq!(
            plan.config_references,
            vec!["example_demo.yaml", "sweeps/fast.yaml"]
        );
        true
    };
    stash.detach(&DetachRequest::new("demo"), &confirm).unwrap();
}

#[test]
fn forced_detach_removes_every_trace() {
    let project = attached_project();
    let stash = stash(&project, FakeRunner::new());

    let summary = stash.detach(&forced("demo"), &never).unwrap();

    let doc = RegistryStore::for_project(&NormalizedPath::new(project.root()))
        .load()
        .unwrap();
    assert!(!doc.contains_tool("demo"));
    assert_eq!(project.read(".gitignore"), "venv/\n\n# Tools\n");
    project.assert_file_not_exists("tools/demo");
    project.assert_file_not_exists("configs/example_demo.yaml");

    assert_eq!(
        stash.git().runner().lines(),
        vec![
            "git submodule deinit -f tools/demo".to_string(),
            "git rm -f tools/demo".to_string(),
        ]
    );

    let backup = summary.backup.unwrap();
    assert!(backup.join("src/main.py").is_file());
    assert!(backup.relative_to(&NormalizedPath::new(project.root())).is_some());
    assert!(backup
        .file_name()
        .unwrap()
        .starts_with("demo_"));
}

#[test]
fn no_backup_and_keep_ignore_are_honoured() {
    let project = attached_project();
    let stash = stash(&project, FakeRunner::new());
    let request = DetachRequest {
        no_backup: true,
        keep_ignore: true,
        ..forced("demo")
    };

    let summary = stash.detach(&request, &never).unwrap();

    assert!(summary.backup.is_none());
    project.assert_file_not_exists("backups");
    project.assert_file_contains(".gitignore", "tools/demo/");
}

#[test]
fn git_failures_are_warnings() {
    let project = attached_project();
    let runner = FakeRunner::new().respond(
        "git submodule deinit",
        CommandOutput::failure(Some(1), "error: pathspec 'tools/demo' did not match"),
    );
    let stash = stash(&project, runner);

    let summary = stash.detach(&forced("demo"), &never).unwrap();

    let submodule = summary.outcomes.for_step("submodule");
    assert_eq!(submodule.len(), 1);
    assert_eq!(submodule[0].level, OutcomeLevel::Warning);
    project.assert_file_not_exists("tools/demo");
}

#[test]
fn referencing_configs_are_reported_unless_kept() {
    let project = attached_project().with_file("configs/sweeps/fast.yaml", "tool: demo\n");

    let summary = stash(&project, FakeRunner::new())
        .detach(&forced("demo"), &never)
        .unwrap();
    let warnings = summary.outcomes.for_step("configs");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].message, "Configs still reference demo: sweeps/fast.yaml");
    project.assert_file_exists("configs/sweeps/fast.yaml");

    let project = attached_project().with_file("configs/sweeps/fast.yaml", "tool: demo\n");
    let request = DetachRequest {
        keep_configs: true,
        ..forced("demo")
    };
    let summary = stash(&project, FakeRunner::new())
        .detach(&request, &never)
        .unwrap();
    assert!(summary.outcomes.for_step("configs").is_empty());
}

#[test]
fn runs_using_the_tool_are_planned_and_reported() {
    let project = attached_project().with_runs(
        "runs:\n  fast:\n    tool: demo\n    config: fast\n  other:\n    tool: consumer\n    config: other\n",
    );
    let stash = stash(&project, FakeRunner::new());

    let summary = stash.detach(&forced("demo"), &never).unwrap();

    assert_eq!(summary.plan.run_references, vec!["fast"]);
    let warnings = summary.outcomes.for_step("configs");
    assert_eq!(warnings.len(), 1);
    assert_eq!(
        warnings[0].message,
        "Runs in configs/runs.yaml still use demo: fast"
    );
}

#[test]
fn unregistered_unit_still_detaches() {
    let project = TestProject::new()
        .with_registry()
        .with_file("tools/orphan/.git", "gitdir: x\n")
        .with_file("tools/orphan/main.py", "");
    let stash = stash(&project, FakeRunner::new());

    let summary = stash.detach(&forced("orphan"), &never).unwrap();

    assert_eq!(
        summary.outcomes.for_step("registry")[0].message,
        "orphan was not registered"
    );
    project.assert_file_not_exists("tools/orphan");
}

#[test]
fn backup_collision_is_fatal_before_mutation() {
    let project = attached_project();
    let stash = stash(&project, FakeRunner::new());

    // Occupy every name the backup could take within this second and the next
    let now = chrono::Local::now();
    for offset in 0..3 {
        let at = now + chrono::Duration::seconds(offset);
        let name = format!("backups/demo_{}", at.format("%Y%m%d_%H%M%S"));
        fs::create_dir_all(project.path(&name)).unwrap();
    }
    let before = project.snapshot();

    let err = stash.detach(&forced("demo"), &never).unwrap_err();

    assert!(matches!(err, Error::BackupFailed { .. }));
    assert_eq!(project.snapshot(), before);
}
