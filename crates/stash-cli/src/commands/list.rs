//! List command implementation

use std::path::Path;

use colored::Colorize;
use serde::Serialize;
use stash_fs::NormalizedPath;
use stash_meta::{RegistryStore, ToolRecord, ValidationPolicy};

use crate::error::{CliError, Result};

#[derive(Serialize)]
struct ToolEntry<'a> {
    id: &'a str,
    path: &'a str,
    entrypoint: &'a str,
    commit: &'a str,
    branch: &'a str,
    dependencies: &'a [String],
    floating: bool,
}

impl<'a> ToolEntry<'a> {
    fn new(id: &'a str, record: &'a ToolRecord) -> Self {
        Self {
            id,
            path: &record.path,
            entrypoint: &record.entrypoint,
            commit: &record.commit,
            branch: &record.branch,
            dependencies: &record.dependencies,
            floating: record.is_floating(),
        }
    }
}

#[derive(Serialize)]
struct JsonListing<'a> {
    tools: Vec<ToolEntry<'a>>,
    validation: ValidationPolicy,
}

/// Run the list command
pub fn run_list(root: &Path, json: bool) -> Result<()> {
    let doc = RegistryStore::for_project(&NormalizedPath::new(root)).load()?;
    let policy = doc.validation_policy().map_err(CliError::user)?;
    let tools: Vec<ToolEntry<'_>> = doc
        .tools()
        .map(|(id, record)| ToolEntry::new(id, record))
        .collect();

    if json {
        let listing = JsonListing {
            tools,
            validation: policy,
        };
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    println!("{}", "Registered Tools".bold());
    println!();

    if tools.is_empty() {
        println!("  {} (use {} to add one)", "None".dimmed(), "stash attach".cyan());
    }
    for tool in &tools {
        let commit = if tool.floating {
            format!("{} @ {}", tool.branch, tool.commit).dimmed()
        } else {
            tool.commit.yellow()
        };
        println!("  {:<20} {} ({})", tool.id.green(), tool.path, commit);
        println!("  {:<20} {}", "", tool.entrypoint.dimmed());
        if !tool.dependencies.is_empty() {
            println!("  {:<20} depends on {}", "", tool.dependencies.join(", "));
        }
    }

    for (id, message) in doc.invalid_tools() {
        println!("  {:<20} {} {}", id.yellow(), "invalid record:".yellow(), message);
    }

    println!();
    println!(
        "{} {} tool(s). Pinned commits required: {}",
        "Total:".dimmed(),
        tools.len(),
        if policy.require_pinned_commits { "yes" } else { "no" }
    );
    Ok(())
}
