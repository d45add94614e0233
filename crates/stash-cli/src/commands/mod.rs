//! Command implementations for stash-cli

pub mod attach;
pub mod detach;
pub mod list;
pub mod validate;

pub use attach::run_attach;
pub use detach::run_detach;
pub use list::run_list;
pub use validate::run_validate;

use colored::Colorize;
use stash_core::{OutcomeLevel, Outcomes};

/// Print every recorded step outcome, one per line.
pub(crate) fn print_outcomes(outcomes: &Outcomes) {
    for record in outcomes.iter() {
        match record.level {
            OutcomeLevel::Ok => {
                println!("  {} {}", "+".green(), record.message)
            }
            OutcomeLevel::Warning => {
                println!("  {} {}", "!".yellow().bold(), record.message.yellow())
            }
        }
    }
}
