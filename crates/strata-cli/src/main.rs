//! `strata-gen`: lint, generate and inspect strata applications.
//!
//! # Examples
//!
//! ```bash
//! # Check conventions only
//! strata-gen check
//!
//! # Regenerate, deleting stale service files after confirmation
//! strata-gen -C path/to/app gen --prune
//!
//! # Print the route table as JSON
//! strata-gen --format json routes
//! ```

use anyhow::{Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::{Path, PathBuf};
use strata_cli::commands::{self, generate::GenArgs};
use strata_core::cli::{ExitCode, OutputFormat};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Code generator and architecture linter for strata applications.
#[derive(Parser, Debug)]
#[command(name = "strata-gen", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project directory
    #[arg(short = 'C', long = "project-dir", global = true, default_value = ".")]
    project_dir: PathBuf,

    /// Log at debug level, overriding RUST_LOG
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format: pretty, text or json
    #[arg(long, global = true, default_value = "pretty")]
    format: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the architecture linter.
    ///
    /// Exits with status 1 when any violation is found.
    Check,

    /// Lint, then regenerate registries, entry point and service files.
    ///
    /// Generation is skipped when the linter reports violations.
    Gen(GenArgs),

    /// Print the route table derived from the current models.
    Routes,

    /// Print a shell completion script.
    ///
    /// strata-gen completions bash > /usr/share/bash-completion/completions/strata-gen
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Commands {
    fn execute(self, project_dir: &Path, format: OutputFormat) -> Result<ExitCode> {
        match self {
            Self::Check => commands::check::run(project_dir, format),
            Self::Gen(args) => commands::generate::run(project_dir, args, format),
            Self::Routes => commands::routes::run(project_dir, format),
            Self::Completions { shell } => commands::completions::run(shell, &mut Cli::command()),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let format: OutputFormat = cli.format.parse().map_err(|e| anyhow!("{e}"))?;
    let status = cli.command.execute(&cli.project_dir, format)?;
    std::process::exit(status.as_i32());
}

/// Logs go to stderr so that `--format json` output stays parseable.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_defaults() {
        let cli = Cli::parse_from(["strata-gen", "check"]);
        assert!(matches!(cli.command, Commands::Check));
        assert_eq!(cli.project_dir, PathBuf::from("."));
        assert_eq!(cli.format, "pretty");
        assert!(!cli.verbose);
    }

    #[test]
    fn test_gen_flags() {
        let cli = Cli::parse_from([
            "strata-gen",
            "-C",
            "/srv/app",
            "gen",
            "--prune",
            "--yes",
            "--dry-run",
        ]);
        assert_eq!(cli.project_dir, PathBuf::from("/srv/app"));
        let Commands::Gen(args) = cli.command else {
            panic!("expected the gen command");
        };
        assert_eq!(
            args,
            GenArgs {
                prune: true,
                yes: true,
                dry_run: true,
            }
        );
    }

    #[test]
    fn test_yes_requires_prune() {
        assert!(Cli::try_parse_from(["strata-gen", "gen", "--yes"]).is_err());
        assert!(Cli::try_parse_from(["strata-gen", "gen", "--prune", "-y"]).is_ok());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["strata-gen", "routes", "--format", "json", "-v"]);
        assert!(matches!(cli.command, Commands::Routes));
        assert!(cli.verbose);
        assert_eq!(cli.format.parse::<OutputFormat>().unwrap(), OutputFormat::Json);
    }

    #[test]
    fn test_completions_shell() {
        let cli = Cli::parse_from(["strata-gen", "completions", "fish"]);
        assert!(matches!(cli.command, Commands::Completions { shell: Shell::Fish }));
    }

    #[test]
    fn test_command_definition() {
        Cli::command().debug_assert();
    }
}
