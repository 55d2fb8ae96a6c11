//! Shell completion generation command.

use anyhow::Result;
use clap::Command;
use clap_complete::{Shell, generate};
use std::io;
use strata_core::cli::ExitCode;
use tracing::debug;

/// Prints the completion script for `shell` to stdout.
///
/// # Examples
///
/// ```no_run
/// use clap::Command;
/// use clap_complete::Shell;
/// use strata_cli::commands::completions;
///
/// let mut cmd = Command::new("strata-gen");
/// completions::run(Shell::Zsh, &mut cmd).unwrap();
/// ```
///
/// # Errors
///
/// Never fails; the `Result` keeps the command signature uniform.
pub fn run(shell: Shell, cmd: &mut Command) -> Result<ExitCode> {
    debug!("generating {shell} completions");
    let name = cmd.get_name().to_string();
    generate(shell, cmd, name, &mut io::stdout());
    Ok(ExitCode::SUCCESS)
}
