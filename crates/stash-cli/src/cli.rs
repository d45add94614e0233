//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tool Stash - attach and detach tool repositories as git submodules
#[derive(Parser, Debug)]
#[command(name = "stash")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root (defaults to the current directory)
    #[arg(short = 'C', long = "root", global = true, env = "STASH_ROOT")]
    pub root: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Attach a tool repository under tools/<identifier>
    ///
    /// Adds the repository as a submodule, registers it in configs/meta.yaml,
    /// ignores it in .gitignore and writes an example config.
    ///
    /// Examples:
    ///   stash attach demo-tool https://github.com/acme/demo-tool
    ///   stash attach demo-tool git@github.com:acme/demo-tool.git --branch dev
    ///   stash attach demo-tool https://github.com/acme/demo-tool --pin v1.2.0
    Attach {
        /// Tool identifier (letters, digits, '-' and '_')
        identifier: String,

        /// Repository URL
        source_url: String,

        /// Branch to track
        #[arg(short, long)]
        branch: Option<String>,

        /// Entrypoint to record when none is detected
        #[arg(short, long)]
        entrypoint: Option<String>,

        /// Skip the consistency check after attaching
        #[arg(long)]
        skip_validation: bool,

        /// Add tools/<identifier>/ to .gitignore (default)
        #[arg(long, overrides_with = "no_gitignore")]
        gitignore: bool,

        /// Leave .gitignore untouched
        #[arg(long, overrides_with = "gitignore")]
        no_gitignore: bool,

        /// Skip the git/uv availability checks
        #[arg(long)]
        skip_prereqs: bool,

        /// Check out and record this revision instead of following the branch
        #[arg(long)]
        pin: Option<String>,

        /// Run `uv sync` in the tool after cloning
        #[arg(long)]
        sync_env: bool,
    },

    /// Detach a tool and remove its traces
    ///
    /// Examples:
    ///   stash detach demo-tool --dry-run
    ///   stash detach demo-tool --force --no-backup
    Detach {
        /// Tool identifier
        identifier: String,

        /// Show what would be removed without changing anything
        #[arg(long)]
        dry_run: bool,

        /// Do not ask for confirmation
        #[arg(short, long)]
        force: bool,

        /// Do not copy the tool to backups/ first
        #[arg(long)]
        no_backup: bool,

        /// Do not warn about configs that still reference the tool
        #[arg(long)]
        keep_configs: bool,

        /// Leave the .gitignore entry in place
        #[arg(long)]
        keep_gitignore: bool,
    },

    /// Check registry, tools, runs and config documents for consistency
    Validate {
        /// Also check documents in configs/<namespace>/ (repeatable)
        #[arg(short, long)]
        namespace: Vec<String>,

        /// Registry structure, tool paths and runs only
        #[arg(long)]
        quick: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// List registered tools
    List {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("stash").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn attach_defaults() {
        let cli = parse(&["attach", "demo", "https://github.com/acme/demo"]);
        match cli.command {
            Commands::Attach {
                identifier,
                branch,
                gitignore,
                no_gitignore,
                pin,
                ..
            } => {
                assert_eq!(identifier, "demo");
                assert_eq!(branch, None);
                assert!(!gitignore);
                assert!(!no_gitignore);
                assert_eq!(pin, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn last_gitignore_flag_wins() {
        let cli = parse(&[
            "attach",
            "demo",
            "https://github.com/acme/demo",
            "--gitignore",
            "--no-gitignore",
        ]);
        assert!(matches!(
            cli.command,
            Commands::Attach {
                gitignore: false,
                no_gitignore: true,
                ..
            }
        ));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["detach", "demo", "--dry-run", "-v", "-C", "/tmp/project"]);
        assert!(cli.verbose);
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/project")));
        assert!(matches!(
            cli.command,
            Commands::Detach { dry_run: true, force: false, .. }
        ));
    }

    #[test]
    fn repeated_namespaces() {
        let cli = parse(&["validate", "-n", "sweeps", "--namespace", "ablations", "--json"]);
        assert_eq!(
            cli.command,
            Commands::Validate {
                namespace: vec!["sweeps".into(), "ablations".into()],
                quick: false,
                json: true,
            }
        );
    }

    #[test]
    fn identifier_is_required() {
        assert!(Cli::try_parse_from(["stash", "detach"]).is_err());
    }
}
