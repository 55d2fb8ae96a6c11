//! Command-level tests against temporary projects.

use std::fs;
use std::path::Path;
use strata_cli::commands::generate::{self, GenArgs};
use strata_cli::commands::{check, routes};
use strata_core::cli::{ExitCode, OutputFormat};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "src/model/user.rs",
        "use strata::model;\n\npub struct User {\n    pub base: model::Base,\n}\n",
    );
    write(
        dir.path(),
        "src/model/user.design.toml",
        "[User]\nendpoint = \"users\"\n\n[User.create]\nservice = true\n\n[User.get]\nservice = true\n",
    );
    dir
}

#[test]
fn test_gen_then_check_is_clean() {
    let dir = project();
    assert_eq!(
        generate::run(dir.path(), GenArgs::default(), OutputFormat::Text).unwrap(),
        ExitCode::SUCCESS
    );
    assert_eq!(check::run(dir.path(), OutputFormat::Text).unwrap(), ExitCode::SUCCESS);
}

#[test]
fn test_prune_with_yes() {
    let dir = project();
    generate::run(dir.path(), GenArgs::default(), OutputFormat::Text).unwrap();
    let stale = dir.path().join("src/service/user/get.rs");
    assert!(stale.exists());

    write(
        dir.path(),
        "src/model/user.design.toml",
        "[User]\nendpoint = \"users\"\n\n[User.create]\nservice = true\n",
    );
    let args = GenArgs {
        prune: true,
        yes: true,
        dry_run: false,
    };
    assert_eq!(
        generate::run(dir.path(), args, OutputFormat::Json).unwrap(),
        ExitCode::SUCCESS
    );
    assert!(!stale.exists());
    assert!(dir.path().join("src/service/user/create.rs").exists());
}

#[test]
fn test_routes_and_bad_config() {
    let dir = project();
    assert_eq!(routes::run(dir.path(), OutputFormat::Text).unwrap(), ExitCode::SUCCESS);

    write(dir.path(), "strata.toml", "[gen\n");
    assert!(routes::run(dir.path(), OutputFormat::Text).is_err());
}
