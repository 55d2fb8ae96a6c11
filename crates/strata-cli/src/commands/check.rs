//! `check`: run the linter only.

use anyhow::Result;
use std::path::Path;
use strata_core::cli::{ExitCode, OutputFormat};
use tracing::info;

use super::common::{Project, print};

/// Lints the project at `project_dir` and prints the findings.
///
/// Returns [`ExitCode::VIOLATIONS`] when anything was flagged.
///
/// # Errors
///
/// Returns an error if the project cannot be loaded or read.
pub fn run(project_dir: &Path, format: OutputFormat) -> Result<ExitCode> {
    let project = Project::load(project_dir)?;
    info!("checking {}", project.root.display());
    let report = project.lint()?;
    print(&report, format)?;
    Ok(report.exit_code())
}
