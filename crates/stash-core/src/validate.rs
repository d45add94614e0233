//! Read-only consistency checks across registry, tools, runs and documents
//!
//! The validator never mutates anything. It collects [`Finding`]s into a
//! [`ValidationReport`]; only error-severity findings fail the report.

use std::fs;

use serde::Serialize;
use stash_fs::{NormalizedPath, ProjectPath};
use stash_meta::{ExperimentDocument, RegistryDocument, RegistryStore, RunDefinitions};

use crate::entrypoint::EntryReference;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    RegistryUnreadable,
    MissingSection,
    ToolRecordInvalid,
    ToolPathMissing,
    EntrypointMissing,
    EntrypointUnresolved,
    RunsUnreadable,
    RunUnknownTool,
    RunConfigMissing,
    NamespaceMissing,
    DocumentMalformed,
    DocumentFieldMissing,
    ExperimentMissing,
}

/// One inconsistency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub kind: FindingKind,
    /// What the finding is about: a tool id, run name or document path
    pub subject: String,
    pub message: String,
}

impl Finding {
    pub fn error(kind: FindingKind, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            subject: subject.into(),
            message: message.into(),
        }
    }

    pub fn warning(kind: FindingKind, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            subject: subject.into(),
            message: message.into(),
        }
    }
}

/// Findings from one validation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    /// True when no error-severity finding was raised.
    pub fn passed(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
    }

    pub fn of_kind(&self, kind: FindingKind) -> Vec<&Finding> {
        self.findings.iter().filter(|f| f.kind == kind).collect()
    }

    fn push(&mut self, finding: Finding) {
        match finding.severity {
            Severity::Error => {
                tracing::warn!(kind = ?finding.kind, subject = %finding.subject, "{}", finding.message)
            }
            Severity::Warning => {
                tracing::info!(kind = ?finding.kind, subject = %finding.subject, "{}", finding.message)
            }
        }
        self.findings.push(finding);
    }
}

/// Which checks to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Every check, including namespaces and entrypoint resolution
    #[default]
    Full,
    /// Registry structure, tool paths and runs
    Reduced,
}

/// Consistency validator for one project.
pub struct Validator {
    root: NormalizedPath,
    mode: ValidationMode,
    namespaces: Vec<String>,
}

impl Validator {
    pub fn new(root: NormalizedPath, mode: ValidationMode) -> Self {
        Self {
            root,
            mode,
            namespaces: Vec::new(),
        }
    }

    /// Also check every document in `configs/<namespace>/` (full mode only).
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespaces.push(namespace.into());
        self
    }

    pub fn run(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        let registry = self.check_registry(&mut report);
        self.check_runs(registry.as_ref(), &mut report);

        if self.mode == ValidationMode::Full {
            for namespace in &self.namespaces {
                self.check_namespace(namespace, registry.as_ref(), &mut report);
            }
        }

        tracing::debug!(
            findings = report.findings.len(),
            passed = report.passed(),
            "validation finished"
        );
        report
    }

    fn configs_dir(&self) -> NormalizedPath {
        self.root.join(ProjectPath::ConfigsDir)
    }

    fn check_registry(&self, report: &mut ValidationReport) -> Option<RegistryDocument> {
        let store = RegistryStore::for_project(&self.root);
        let doc = match store.load() {
            Ok(doc) => doc,
            Err(e) => {
                report.push(Finding::error(
                    FindingKind::RegistryUnreadable,
                    ProjectPath::Registry.as_str(),
                    e.to_string(),
                ));
                return None;
            }
        };

        for section in doc.missing_sections() {
            report.push(Finding::error(
                FindingKind::MissingSection,
                section,
                format!("Missing required section: {section}"),
            ));
        }

        for (id, message) in doc.invalid_tools() {
            report.push(Finding::error(
                FindingKind::ToolRecordInvalid,
                id,
                format!("Tool {id} has an invalid record: {message}"),
            ));
        }

        for (id, record) in doc.tools() {
            let tool_root = crate::project_path(&self.root, &record.path);
            if record.path.is_empty() || !tool_root.is_dir() {
                report.push(Finding::error(
                    FindingKind::ToolPathMissing,
                    id,
                    format!("Tool path does not exist: {}", record.path),
                ));
            }

            if record.entrypoint.trim().is_empty() {
                report.push(Finding::error(
                    FindingKind::EntrypointMissing,
                    id,
                    format!("Tool {id} has no entrypoint"),
                ));
            } else if self.mode == ValidationMode::Full && tool_root.is_dir() {
                let entry = EntryReference::parse(&record.entrypoint);
                if !entry.exists_under(&tool_root) {
                    report.push(Finding::warning(
                        FindingKind::EntrypointUnresolved,
                        id,
                        format!("Tool entrypoint not found: {}", entry.target(&tool_root)),
                    ));
                }
            }
        }

        Some(doc)
    }

    fn check_runs(&self, registry: Option<&RegistryDocument>, report: &mut ValidationReport) {
        let path = self.root.join(ProjectPath::Runs);
        let runs = match RunDefinitions::load(&path) {
            Ok(runs) => runs,
            Err(e) => {
                report.push(Finding::error(
                    FindingKind::RunsUnreadable,
                    ProjectPath::Runs.as_str(),
                    e.to_string(),
                ));
                return;
            }
        };

        let configs_dir = self.configs_dir();
        for (name, run) in runs.iter() {
            let registered = run
                .tool
                .as_deref()
                .is_some_and(|tool| registry.is_some_and(|doc| doc.contains_tool(tool)));
            if !registered {
                let tool = run.tool.as_deref().unwrap_or("<none>");
                report.push(Finding::error(
                    FindingKind::RunUnknownTool,
                    name,
                    format!("Run {name}: tool {tool} not found in registry"),
                ));
            }

            match run.config_path(&configs_dir) {
                Some(config) if config.is_file() => {}
                Some(config) => report.push(Finding::error(
                    FindingKind::RunConfigMissing,
                    name,
                    format!("Run {name}: config file not found: {config}"),
                )),
                None => report.push(Finding::error(
                    FindingKind::RunConfigMissing,
                    name,
                    format!("Run {name}: no config given"),
                )),
            }
        }
    }

    fn check_namespace(
        &self,
        namespace: &str,
        registry: Option<&RegistryDocument>,
        report: &mut ValidationReport,
    ) {
        let dir = self.configs_dir().join(namespace);
        let Ok(entries) = fs::read_dir(dir.to_native()) else {
            report.push(Finding::error(
                FindingKind::NamespaceMissing,
                namespace,
                format!("Config directory not found: {dir}"),
            ));
            return;
        };

        let mut documents: Vec<NormalizedPath> = entries
            .flatten()
            .map(|entry| NormalizedPath::new(entry.path()))
            .filter(|path| path.is_file() && path.extension() == Some("yaml"))
            .collect();
        documents.sort_by(|a, b| a.as_str().cmp(b.as_str()));

        for path in documents {
            let subject = path
                .relative_to(&self.configs_dir())
                .map(|rel| rel.as_str().to_string())
                .unwrap_or_else(|| path.as_str().to_string());

            let doc = match ExperimentDocument::load(&path) {
                Ok(doc) => doc,
                Err(e) => {
                    report.push(Finding::error(
                        FindingKind::DocumentMalformed,
                        &subject,
                        e.to_string(),
                    ));
                    continue;
                }
            };

            for field in doc.missing_fields() {
                report.push(Finding::error(
                    FindingKind::DocumentFieldMissing,
                    &subject,
                    format!("Missing '{field}' in {subject}"),
                ));
            }

            if let (Some(tool), Some(experiment)) = (doc.tool(), doc.experiment()) {
                let tool_path = registry
                    .and_then(|doc| doc.tool(&tool))
                    .map(|record| record.path.clone())
                    .unwrap_or_else(|| format!("{}/{tool}", ProjectPath::ToolsDir.as_str()));
                let experiment_file = crate::project_path(&self.root, &tool_path)
                    .join(format!("src/configs/experiment/{experiment}.yaml"));
                if !experiment_file.is_file() {
                    report.push(Finding::error(
                        FindingKind::ExperimentMissing,
                        &subject,
                        format!("Experiment {experiment} not found in tool {tool}"),
                    ));
                }
            }
        }
    }
}
