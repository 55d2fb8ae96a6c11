//! `routes`: print the route table the router registry would expose.

use anyhow::{Context, Result};
use std::path::Path;
use strata_codegen::{Pipeline, TomlDesignSource};
use strata_core::cli::{ExitCode, OutputFormat};

use super::common::{Project, print};

/// Discovers models and prints their composed routes.
///
/// # Errors
///
/// Returns an error if discovery fails or two endpoints collide.
pub fn run(project_dir: &Path, format: OutputFormat) -> Result<ExitCode> {
    let project = Project::load(project_dir)?;
    let pipeline = Pipeline::new(&project.root, &project.config, &TomlDesignSource);
    let routes = pipeline.routes().context("failed to compute routes")?;
    print(&routes, format)?;
    Ok(ExitCode::SUCCESS)
}
