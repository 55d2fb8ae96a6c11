//! Common utilities shared across CLI commands.

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::Confirm as Prompt;
use serde::Serialize;
use std::path::{Path, PathBuf};
use strata_codegen::Confirm;
use strata_core::ProjectConfig;
use strata_core::cli::OutputFormat;
use strata_lint::{LintReport, Linter};
use tracing::{debug, warn};

use crate::formatters::{Render, format_output};

/// A project directory and its loaded configuration.
#[derive(Debug)]
pub struct Project {
    /// Project root
    pub root: PathBuf,
    /// Contents of `strata.toml`, or the defaults
    pub config: ProjectConfig,
}

impl Project {
    /// Loads the project at `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` is not a directory or `strata.toml` is
    /// invalid.
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            anyhow::bail!("project directory {} does not exist", dir.display());
        }
        let config = ProjectConfig::load(dir)
            .with_context(|| format!("failed to load configuration of {}", dir.display()))?;
        debug!("project root {}", dir.display());
        Ok(Self {
            root: dir.to_path_buf(),
            config,
        })
    }

    /// Runs the linter over the project.
    ///
    /// # Errors
    ///
    /// Returns an error if the source tree cannot be read.
    pub fn lint(&self) -> Result<LintReport> {
        Linter::new(&self.root, &self.config)
            .run()
            .context("lint run failed")
    }
}

/// Prints `data` to stdout in the requested format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn print<T: Serialize + Render>(data: &T, format: OutputFormat) -> Result<()> {
    println!("{}", format_output(data, format)?);
    Ok(())
}

/// Interactive y/N prompt before stale files are deleted.
///
/// The default answer is no; a prompt that cannot be shown (no terminal,
/// closed stdin) also answers no.
#[derive(Debug)]
pub struct DialoguerConfirm {
    root: PathBuf,
}

impl DialoguerConfirm {
    /// Creates a prompt listing paths relative to `root`.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }
}

impl Confirm for DialoguerConfirm {
    fn confirm(&mut self, candidates: &[PathBuf]) -> bool {
        eprintln!("{}", "Stale service files:".bold().yellow());
        for path in candidates {
            eprintln!("  {}", path.strip_prefix(&self.root).unwrap_or(path).display());
        }
        match Prompt::new()
            .with_prompt(format!("Delete {} file(s)?", candidates.len()))
            .default(false)
            .interact()
        {
            Ok(answer) => answer,
            Err(e) => {
                warn!("cannot prompt for confirmation, keeping files: {e}");
                false
            }
        }
    }
}
