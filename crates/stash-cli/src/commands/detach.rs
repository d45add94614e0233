//! Detach command implementation

use std::path::Path;

use colored::Colorize;
use stash_core::{DetachRequest, Stash};
use stash_fs::NormalizedPath;

use super::print_outcomes;
use crate::error::Result;
use crate::interactive::PromptConfirmation;

/// Run the detach command
pub fn run_detach(root: &Path, request: DetachRequest) -> Result<()> {
    let stash = Stash::open(NormalizedPath::new(root))?;

    if request.dry_run {
        println!(
            "{} {} {}",
            "Detaching".bold(),
            request.identifier.cyan(),
            "(dry run)".dimmed()
        );
    } else {
        println!("{} {}", "Detaching".bold(), request.identifier.cyan());
    }

    let summary = stash.detach(&request, &PromptConfirmation)?;
    print_outcomes(&summary.outcomes);

    println!();
    if summary.dry_run {
        println!("{} no changes made", "Dry run:".yellow().bold());
        return Ok(());
    }

    println!(
        "{} {} detached",
        "Done:".green().bold(),
        summary.identifier.cyan()
    );
    if let Some(backup) = &summary.backup {
        println!("  {}: {}", "Backup".dimmed(), backup);
    }
    Ok(())
}
