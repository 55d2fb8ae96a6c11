//! `gen`: lint, then generate.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::Path;
use strata_codegen::pruner::AssumeYes;
use strata_codegen::{Confirm, GenOptions, Pipeline, TomlDesignSource};
use strata_core::cli::{ExitCode, OutputFormat};
use tracing::{info, warn};

use super::common::{DialoguerConfirm, Project, print};

/// Flags of the `gen` command.
#[derive(Args, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenArgs {
    /// Delete service files no model requires anymore
    #[arg(long)]
    pub prune: bool,
    /// Do not ask before deleting stale files
    #[arg(short, long, requires = "prune")]
    pub yes: bool,
    /// Report what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Lints the project and, if it is clean, regenerates it.
///
/// Lint violations abort before anything is written and return
/// [`ExitCode::VIOLATIONS`].
///
/// # Errors
///
/// Returns an error if the project cannot be loaded, a model descriptor is
/// malformed, two endpoints collide or a file cannot be written.
pub fn run(project_dir: &Path, args: GenArgs, format: OutputFormat) -> Result<ExitCode> {
    let project = Project::load(project_dir)?;

    let lint = project.lint()?;
    if !lint.is_clean() {
        warn!(
            "{} lint violation(s), not generating",
            lint.violations.len()
        );
        print(&lint, format)?;
        return Ok(lint.exit_code());
    }

    let pipeline = Pipeline::new(&project.root, &project.config, &TomlDesignSource);
    let options = GenOptions {
        prune: args.prune,
        dry_run: args.dry_run,
    };
    let mut confirm: Box<dyn Confirm> = if args.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(DialoguerConfirm::new(&project.root))
    };
    let report = pipeline
        .run(options, confirm.as_mut())
        .context("generation failed")?;

    if report.models == 0 {
        info!("nothing to generate");
    }
    print(&report, format)?;
    if args.dry_run && report.changed_count() > 0 && format != OutputFormat::Json {
        eprintln!("{}", "dry run: no files were written".dimmed());
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let model = dir.path().join("src/model/user.rs");
        fs::create_dir_all(model.parent().unwrap()).unwrap();
        fs::write(
            &model,
            "use strata::model;\n\npub struct User {\n    pub base: model::Base,\n}\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("src/model/user.design.toml"),
            "[User]\nendpoint = \"users\"\n\n[User.create]\nservice = true\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_gen_writes_files() {
        let dir = project();
        let code = run(dir.path(), GenArgs::default(), OutputFormat::Text).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(dir.path().join("src/main.rs").exists());
        assert!(dir.path().join("src/service/user/create.rs").exists());
    }

    #[test]
    fn test_lint_failure_blocks_generation() {
        let dir = project();
        fs::write(dir.path().join("src/model/orders.rs"), "pub struct Order;\n").unwrap();
        let code = run(dir.path(), GenArgs::default(), OutputFormat::Text).unwrap();
        assert_eq!(code, ExitCode::VIOLATIONS);
        assert!(!dir.path().join("src/main.rs").exists());
    }

    #[test]
    fn test_dry_run() {
        let dir = project();
        let args = GenArgs {
            dry_run: true,
            ..GenArgs::default()
        };
        assert_eq!(run(dir.path(), args, OutputFormat::Json).unwrap(), ExitCode::SUCCESS);
        assert!(!dir.path().join("src/main.rs").exists());
    }
}
