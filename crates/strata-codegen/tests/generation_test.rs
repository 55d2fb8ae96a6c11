//! End-to-end generation over temporary projects.
//!
//! Tests cover:
//! - Idempotence of a second run
//! - Endpoint composition through descriptor sidecars
//! - Import aliasing of colliding packages
//! - Minimal patches of hand-edited service files
//! - Repointing service files at a moved model package
//! - Pruning safety (confirmation, ignore patterns)

use std::fs;
use std::path::Path;
use strata_codegen::pruner::{AssumeNo, AssumeYes};
use strata_codegen::{FileStatus, GenOptions, GenReport, Pipeline, TomlDesignSource};
use strata_core::{ProjectConfig, is_generated};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap()
}

fn model_source(type_name: &str) -> String {
    format!("use strata::model;\n\npub struct {type_name} {{\n    pub base: model::Base,\n}}\n")
}

fn squash(s: &str) -> String {
    s.split_whitespace()
        .collect::<String>()
        .replace(",)", ")")
        .replace(",>", ">")
}

fn run(root: &Path, config: &ProjectConfig, options: GenOptions) -> GenReport {
    let pipeline = Pipeline::new(root, config, &TomlDesignSource);
    pipeline.run(options, &mut AssumeYes).unwrap()
}

fn user_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/model/user.rs", &model_source("User"));
    write(
        dir.path(),
        "src/model/user.design.toml",
        r#"
[User]
migrate = true
endpoint = "users"

[User.create]
service = true

[User.get]
service = true
public = true

[User.list]
"#,
    );
    dir
}

#[test]
fn test_second_run_is_unchanged() {
    let dir = user_project();
    let config = ProjectConfig::default();

    let first = run(dir.path(), &config, GenOptions::default());
    assert!(first.changed_count() > 0);
    let main = read(dir.path(), "src/main.rs");
    let router = read(dir.path(), "src/router/registry.rs");

    let second = run(dir.path(), &config, GenOptions::default());
    for file in &second.files {
        assert_eq!(file.status, FileStatus::Unchanged, "{}", file.path);
    }
    assert_eq!(read(dir.path(), "src/main.rs"), main);
    assert_eq!(read(dir.path(), "src/router/registry.rs"), router);
}

#[test]
fn test_generated_files_carry_the_header() {
    let dir = user_project();
    run(dir.path(), &ProjectConfig::default(), GenOptions::default());

    for rel in [
        "src/main.rs",
        "src/model/registry.rs",
        "src/service/registry.rs",
        "src/router/registry.rs",
    ] {
        assert!(is_generated(&read(dir.path(), rel)), "{rel}");
    }
    assert!(!is_generated(&read(dir.path(), "src/service/user/create.rs")));

    let main = squash(&read(dir.path(), "src/main.rs"));
    assert!(main.contains("modmodel;modrouter;modservice;"));
    assert!(main.contains(
        "bootstrap::init()?;crate::model::registry::init();crate::service::registry::init();crate::router::registry::init()?;bootstrap::run()"
    ));

    let router = squash(&read(dir.path(), "src/router/registry.rs"));
    assert!(router.contains(
        "router::register::<user::User,user::User,user::User>(router::auth(),\"users\",types::Phase::Create)?;"
    ));
    assert!(router.contains(
        "router::register::<user::User,user::User,user::User>(router::public(),\"users\",types::Phase::Get)?;"
    ));
}

#[test]
fn test_endpoint_composition() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "src/model/config/namespace.rs", &model_source("Namespace"));
    write(
        root,
        "src/model/config/namespace.design.toml",
        "[Namespace]\nendpoint = \"namespaces\"\nparam = \"ns\"\n\n[Namespace.list]\n",
    );
    write(root, "src/model/config/namespace/app.rs", &model_source("App"));
    write(
        root,
        "src/model/config/namespace/app.design.toml",
        "[App]\nendpoint = \"apps\"\nparam = \"app\"\n\n[App.list]\n",
    );
    write(root, "src/model/config/namespace/app/env.rs", &model_source("Env"));
    write(
        root,
        "src/model/config/namespace/app/env.design.toml",
        "[Env]\nendpoint = \"envs\"\n\n[Env.list]\n\n[Env.get]\n",
    );

    let config = ProjectConfig::default();
    let pipeline = Pipeline::new(root, &config, &TomlDesignSource);
    let mut paths: Vec<String> = pipeline
        .routes()
        .unwrap()
        .into_iter()
        .map(|r| format!("{} {}", r.method, r.path))
        .collect();
    paths.sort();
    assert_eq!(
        paths,
        vec![
            "GET /config/namespaces",
            "GET /config/namespaces/:ns/apps",
            "GET /config/namespaces/:ns/apps/:app/envs",
            "GET /config/namespaces/:ns/apps/:app/envs/:id",
        ]
    );

    run(root, &config, GenOptions::default());
    let router = read(root, "src/router/registry.rs");
    assert!(router.contains("\"config/namespaces/:ns/apps/:app/envs\""));
}

#[test]
fn test_colliding_packages_get_aliases() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "src/model/config/item.rs", &model_source("Setting"));
    write(
        root,
        "src/model/config/item.design.toml",
        "[Setting]\nmigrate = true\n\n[Setting.create]\nservice = true\n",
    );
    write(root, "src/model/store/item.rs", &model_source("Product"));
    write(
        root,
        "src/model/store/item.design.toml",
        "[Product]\nmigrate = true\n\n[Product.create]\nservice = true\n",
    );
    run(root, &ProjectConfig::default(), GenOptions::default());

    let models = squash(&read(root, "src/model/registry.rs"));
    assert!(models.contains("usecrate::model::config::itemasconfig_item;"));
    assert!(models.contains("usecrate::model::store::itemasstore_item;"));
    assert!(models.contains("model::register::<config_item::Setting>();"));
    assert!(models.contains("model::register::<store_item::Product>();"));

    let services = squash(&read(root, "src/service/registry.rs"));
    assert!(services.contains("usecrate::service::config::setting::createassetting_create;"));
    assert!(services.contains("service::register::<setting_create::SettingCreator>(types::Phase::Create);"));
    assert!(services.contains("service::register::<product_create::ProductCreator>(types::Phase::Create);"));

    let router = squash(&read(root, "src/router/registry.rs"));
    assert!(router.contains("usestrata::router;"));
    assert!(!router.contains("usestrata::routerasstrata_router;"));
}

#[test]
fn test_patch_keeps_hand_written_code() {
    let dir = user_project();
    let root = dir.path();
    let config = ProjectConfig::default();
    run(root, &config, GenOptions::default());

    let service = "src/service/user/create.rs";
    let fresh = read(root, service);
    let edited = format!(
        "{}\n// helpers below are mine\nfn audit() {{}}\n",
        fresh.replace("Ok(Default::default())", "audit();\n        Ok(user::User::default())")
    );
    write(root, service, &edited);

    write(
        root,
        "src/model/user.design.toml",
        r#"
[User]
migrate = true
endpoint = "users"

[User.create]
service = true
payload = "UserReq"
result = "Box<UserView>"

[User.get]
service = true
public = true
"#,
    );
    let report = run(root, &config, GenOptions::default());
    assert_eq!(report.status_of(service), Some(FileStatus::Changed));
    assert_eq!(
        report.status_of("src/service/user/get.rs"),
        Some(FileStatus::Unchanged)
    );

    let patched = read(root, service);
    assert!(patched.contains("service::Base<user::User, user::UserReq, Box<user::UserView>>"));
    assert!(patched.contains("req: user::UserReq"));
    assert!(patched.contains("strata::Result<Box<user::UserView>>"));
    assert!(patched.contains("audit();\n        Ok(user::User::default())"));
    assert!(patched.contains("// helpers below are mine\nfn audit() {}\n"));
    assert!(patched.contains("u: &mut user::User"));

    let again = run(root, &config, GenOptions::default());
    assert_eq!(again.status_of(service), Some(FileStatus::Unchanged));
}

#[test]
fn test_moved_model_package_is_repointed() {
    let dir = user_project();
    let root = dir.path();
    let config = ProjectConfig::default();
    run(root, &config, GenOptions::default());

    let service = "src/service/user/create.rs";
    let edited = read(root, service).replace(
        "Ok(Default::default())",
        "println!(\"{:?}\", user::User::default());\n        Ok(Default::default())",
    );
    write(root, service, &edited);

    let sidecar = read(root, "src/model/user.design.toml");
    fs::remove_file(root.join("src/model/user.rs")).unwrap();
    fs::remove_file(root.join("src/model/user.design.toml")).unwrap();
    write(root, "src/model/account.rs", &model_source("User"));
    write(root, "src/model/account.design.toml", &sidecar);

    let report = run(root, &config, GenOptions::default());
    assert_eq!(report.status_of(service), Some(FileStatus::Changed));

    let expected = edited
        .replace("use crate::model::user;", "use crate::model::account;")
        .replace("user::", "account::");
    assert_eq!(read(root, service), expected);
}

#[test]
fn test_prune_requires_confirmation_and_honors_ignore() {
    let dir = user_project();
    let root = dir.path();
    run(root, &ProjectConfig::default(), GenOptions::default());
    write(
        root,
        "src/model/user.design.toml",
        "[User]\nendpoint = \"users\"\n\n[User.create]\nservice = true\n",
    );
    let stale = root.join("src/service/user/get.rs");
    let options = GenOptions {
        prune: true,
        dry_run: false,
    };

    let config = ProjectConfig::default();
    let pipeline = Pipeline::new(root, &config, &TomlDesignSource);
    let declined = pipeline.run(options, &mut AssumeNo).unwrap();
    assert!(declined.pruned.is_empty());
    assert!(stale.exists());

    let protected = ProjectConfig::from_toml("[prune]\nignore = [\"user/get\"]\n").unwrap();
    let report = run(root, &protected, options);
    assert!(report.pruned.is_empty());
    assert!(stale.exists());

    let report = run(root, &config, options);
    assert_eq!(report.pruned, vec!["src/service/user/get.rs"]);
    assert!(!stale.exists());
    assert!(root.join("src/service/user/create.rs").exists());
    assert_eq!(read(root, "src/service/user/mod.rs"), "pub mod create;\n");
}
