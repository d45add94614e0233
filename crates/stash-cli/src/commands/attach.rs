//! Attach command implementation

use std::path::Path;

use colored::Colorize;
use stash_core::{AttachRequest, Stash};
use stash_fs::NormalizedPath;

use super::print_outcomes;
use crate::error::Result;

/// Run the attach command
pub fn run_attach(root: &Path, request: AttachRequest) -> Result<()> {
    let stash = Stash::open(NormalizedPath::new(root))?;

    println!(
        "{} {} from {}",
        "Attaching".bold(),
        request.identifier.cyan(),
        request.source_url
    );

    let summary = stash.attach(&request)?;
    print_outcomes(&summary.outcomes);

    println!();
    println!(
        "{} {} attached at {}",
        "Done:".green().bold(),
        summary.identifier.cyan(),
        summary.root_path
    );
    println!("  {}: {}", "Entrypoint".dimmed(), summary.entry_reference);
    println!("  {}:     {}", "Commit".dimmed(), summary.commit);

    let warnings = summary.outcomes.warnings().count();
    if warnings > 0 {
        println!(
            "  {} {} warning(s); review the lines marked {}",
            "Note:".yellow(),
            warnings,
            "!".yellow().bold()
        );
    }
    Ok(())
}
