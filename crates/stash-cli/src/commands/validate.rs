//! Validate command implementation

use std::path::Path;

use colored::Colorize;
use serde::Serialize;
use stash_core::{Finding, Severity, ValidationMode, ValidationReport, Validator};
use stash_fs::NormalizedPath;

use crate::error::{CliError, Result};

#[derive(Serialize)]
struct JsonReport<'a> {
    passed: bool,
    errors: usize,
    warnings: usize,
    findings: &'a [Finding],
}

/// Run the validate command
///
/// Fails (exit 1) when any error-severity finding is reported.
pub fn run_validate(root: &Path, namespaces: &[String], quick: bool, json: bool) -> Result<()> {
    let mode = if quick {
        ValidationMode::Reduced
    } else {
        ValidationMode::Full
    };
    let validator = namespaces
        .iter()
        .fold(Validator::new(NormalizedPath::new(root), mode), |v, ns| {
            v.with_namespace(ns.as_str())
        });
    let report = validator.run();
    let errors = report.errors().count();

    if json {
        let output = JsonReport {
            passed: report.passed(),
            errors,
            warnings: report.warnings().count(),
            findings: &report.findings,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_report(&report);
    }

    if report.passed() {
        Ok(())
    } else {
        Err(CliError::user(format!(
            "Validation failed with {errors} error(s)"
        )))
    }
}

fn print_report(report: &ValidationReport) {
    println!("{}", "Consistency Check".bold());
    println!();

    for finding in &report.findings {
        let label = match finding.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };
        println!("  {label:<8} {}: {}", finding.subject.cyan(), finding.message);
    }
    if !report.findings.is_empty() {
        println!();
    }

    if report.passed() {
        println!("{} all checks passed", "OK:".green().bold());
    }
}
