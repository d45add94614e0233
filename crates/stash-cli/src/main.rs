//! Tool Stash CLI
//!
//! Attaches and detaches tool repositories and checks project consistency.

mod cli;
mod commands;
mod error;
mod interactive;

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use stash_core::{AttachRequest, DetachRequest};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let root = match cli.root {
        Some(root) => root,
        None => stash_core::discover_root(&std::env::current_dir()?).to_native(),
    };
    tracing::debug!(root = %root.display(), "project root");

    execute_command(root, cli.command)
}

/// Logs go to stderr; `RUST_LOG` applies unless `--verbose` is given.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("{}: tracing already initialised", "warning".yellow());
    }
}

fn execute_command(root: PathBuf, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Attach {
            identifier,
            source_url,
            branch,
            entrypoint,
            skip_validation,
            gitignore: _,
            no_gitignore,
            skip_prereqs,
            pin,
            sync_env,
        } => {
            let request = AttachRequest {
                branch,
                entrypoint,
                skip_validation,
                manage_ignore: !no_gitignore,
                skip_prereqs,
                pin,
                sync_env,
                ..AttachRequest::new(identifier, source_url)
            };
            commands::run_attach(&root, request)
        }
        Commands::Detach {
            identifier,
            dry_run,
            force,
            no_backup,
            keep_configs,
            keep_gitignore,
        } => {
            let request = DetachRequest {
                identifier,
                dry_run,
                force,
                no_backup,
                keep_configs,
                keep_ignore: keep_gitignore,
            };
            commands::run_detach(&root, request)
        }
        Commands::Validate {
            namespace,
            quick,
            json,
        } => commands::run_validate(&root, &namespace, quick, json),
        Commands::List { json } => commands::run_list(&root, json),
    }
}
