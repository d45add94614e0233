//! Interactive prompts for CLI commands
//!
//! Uses dialoguer for the detach confirmation.

use colored::Colorize;
use dialoguer::Confirm;
use stash_core::{Confirmation, DetachPlan};

/// Asks on the terminal before a detach proceeds.
///
/// Anything but an explicit yes (including a closed or non-interactive
/// terminal) declines.
pub struct PromptConfirmation;

impl Confirmation for PromptConfirmation {
    fn confirm(&self, plan: &DetachPlan) -> bool {
        print_plan(plan);
        Confirm::new()
            .with_prompt(format!("Detach {}?", plan.identifier))
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

fn print_plan(plan: &DetachPlan) {
    println!();
    println!("{}", "Detach plan".bold());
    println!("  {}:  {}", "Tool".dimmed(), plan.identifier.cyan());
    println!("  {}:  {}", "Path".dimmed(), plan.root_path);

    if !plan.dependents.is_empty() {
        println!(
            "  {} depended on by: {}",
            "!".yellow().bold(),
            plan.dependents.join(", ").yellow()
        );
    }
    if !plan.config_references.is_empty() {
        println!("  {} referenced by configs:", "!".yellow().bold());
        for config in &plan.config_references {
            println!("      configs/{config}");
        }
    }
    if !plan.run_references.is_empty() {
        println!(
            "  {} used by runs: {}",
            "!".yellow().bold(),
            plan.run_references.join(", ")
        );
    }
    println!();
}
