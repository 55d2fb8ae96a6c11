//! Incremental service file patcher.
//!
//! A service file is generated once and then belongs to the user. On later
//! runs the patcher only touches what the design drives:
//!
//! - the request and response arguments of the framework service base;
//! - the parameter and return types of the phase method;
//! - the import of the model package and references through it, when the
//!   model moved to another module.
//!
//! Everything else (method bodies, hooks, comments, extra items) is kept
//! byte for byte, because edits are spliced into the original text at the
//! spans the parser reported instead of re-printing the file.

mod edit;
mod render;
mod rename;
pub mod shapes;

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use strata_core::{Action, Error, Result};
use tracing::debug;

use crate::discovery::ModelInfo;
use crate::layout::Layout;
use crate::template_engine::TemplateEngine;
use crate::types::FileStatus;
use crate::writer::write_if_changed;

pub use rename::{UseRewrite, rename_prefix, rewrite_use_item};

/// One service file to produce or update.
#[derive(Debug, Clone)]
pub struct ServiceSpec<'a> {
    /// Owning model
    pub model: &'a ModelInfo,
    /// Custom route, empty for the default route
    pub route: &'a str,
    /// Action implemented by the file
    pub action: &'a Action,
    /// Framework crate name
    pub framework: String,
    /// Service struct name
    pub struct_name: String,
    /// Target file
    pub path: PathBuf,
    /// Module path of the target file, for resolving relative imports
    pub module: Vec<String>,
    /// Module path `crate` stands for
    pub crate_root: Vec<String>,
}

impl<'a> ServiceSpec<'a> {
    /// Describes the service file of `action` on `route` for `model`.
    #[must_use]
    pub fn new(layout: &Layout, model: &'a ModelInfo, route: &'a str, action: &'a Action) -> Self {
        let path = model.service_file(&layout.service_dir, route, action);
        let split = |module: &str| module.split("::").map(str::to_string).collect();
        Self {
            model,
            route,
            action,
            framework: layout.framework.clone(),
            struct_name: action.service_struct_name(&model.type_name, route),
            module: split(&layout.module_path_of_file(&path)),
            crate_root: split(&layout.module),
            path,
        }
    }

    /// Phase method name.
    #[must_use]
    pub const fn method(&self) -> &'static str {
        self.action.phase.as_str()
    }

    /// Declared request type, or the model type.
    #[must_use]
    pub fn payload(&self) -> &str {
        self.action.payload_or(&self.model.type_name)
    }

    /// Declared response type, or the model type.
    #[must_use]
    pub fn result(&self) -> &str {
        self.action.result_or(&self.model.type_name)
    }
}

/// Writes fresh service files and patches existing ones.
#[derive(Debug)]
pub struct ServicePatcher<'a> {
    engine: TemplateEngine<'a>,
}

impl ServicePatcher<'_> {
    /// Creates a patcher with the built-in templates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] if a template fails to register.
    pub fn new() -> Result<Self> {
        Ok(Self {
            engine: TemplateEngine::new()?,
        })
    }

    /// Boilerplate for a service file that does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if a declared type is not valid Rust or the
    /// template fails to render.
    pub fn render(&self, spec: &ServiceSpec<'_>) -> Result<String> {
        render::render_service(&self.engine, spec)
    }

    /// Patched text of an existing service file, or `None` if it is
    /// already up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if a declared type is not valid Rust.
    pub fn patch(&self, src: &str, spec: &ServiceSpec<'_>) -> Result<Option<String>> {
        edit::patch_source(src, spec)
    }

    /// Creates or updates the file described by `spec`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written.
    pub fn apply(&self, spec: &ServiceSpec<'_>, dry_run: bool) -> Result<FileStatus> {
        match fs::read_to_string(&spec.path) {
            Ok(existing) => match self.patch(&existing, spec)? {
                Some(patched) => write_if_changed(&spec.path, &patched, dry_run),
                None => {
                    debug!("{} is up to date", spec.path.display());
                    Ok(FileStatus::Unchanged)
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let content = self.render(spec)?;
                write_if_changed(&spec.path, &content, dry_run)
            }
            Err(e) => Err(Error::io(&spec.path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use strata_core::{Design, GenConfig, Phase};

    fn layout() -> Layout {
        Layout::new(Path::new("/app"), &GenConfig::default())
    }

    fn user(package: &str) -> ModelInfo {
        ModelInfo {
            dir: PathBuf::from("/app/src/model"),
            file_path: PathBuf::from(format!("/app/src/model/{package}.rs")),
            rel_dir: PathBuf::new(),
            package_path: format!("crate::model::{package}"),
            package_name: package.to_string(),
            model_path: package.to_string(),
            type_name: "User".to_string(),
            var_name: "u".to_string(),
            design: Design::enabled("users"),
        }
    }

    fn fresh(model: &ModelInfo, action: &Action) -> String {
        let layout = layout();
        let spec = ServiceSpec::new(&layout, model, "", action);
        ServicePatcher::new().unwrap().render(&spec).unwrap()
    }

    fn patch(src: &str, model: &ModelInfo, action: &Action) -> Option<String> {
        let layout = layout();
        let spec = ServiceSpec::new(&layout, model, "", action);
        ServicePatcher::new().unwrap().patch(src, &spec).unwrap()
    }

    #[test]
    fn test_fresh_boilerplate() {
        let model = user("user");
        let action = Action::new(Phase::Create).with_payload("Box<UserReq>");
        let src = fresh(&model, &action);

        assert!(src.contains("use crate::model::user;"));
        assert!(src.contains("use strata::service;"));
        assert!(src.contains("pub struct UserCreator"));
        assert!(src.contains("pub base: service::Base<user::User, Box<user::UserReq>, user::User>"));
        assert!(src.contains("pub fn create_before("));
        assert!(src.contains("u: &mut user::User"));
        assert!(src.contains("pub fn create_after("));
        assert!(src.contains("req: Box<user::UserReq>"));
        assert!(src.contains("-> strata::Result<user::User>"));
        assert!(syn::parse_str::<syn::File>(&src).is_ok());
    }

    #[test]
    fn test_fresh_hook_shapes() {
        let model = user("user");
        let src = fresh(&model, &Action::new(Phase::List));
        assert!(src.contains("pub fn list_before(&self, ctx: &types::ServiceContext)"));
        assert!(src.contains("us: &mut Vec<user::User>"));

        let src = fresh(&model, &Action::new(Phase::DeleteMany));
        assert!(src.contains("us: &mut [user::User]"));
    }

    #[test]
    fn test_fresh_file_is_a_fixed_point() {
        let model = user("user");
        let action = Action::new(Phase::Get).with_result("UserView");
        let src = fresh(&model, &action);
        assert_eq!(patch(&src, &model, &action), None);
    }

    #[test]
    fn test_payload_change_is_minimal() {
        let model = user("user");
        let src = fresh(&model, &Action::new(Phase::Create));
        let edited = src.replace("Ok(Default::default())", "// custom\n        todo!()");

        let action = Action::new(Phase::Create).with_payload("UserReq");
        let patched = patch(&edited, &model, &action).unwrap();
        assert!(patched.contains("service::Base<user::User, user::UserReq, user::User>"));
        assert!(patched.contains("req: user::UserReq"));
        assert!(patched.contains("// custom\n        todo!()"));
        assert!(patched.contains("u: &mut user::User"));
        assert_eq!(
            patched.replace("user::UserReq", "user::User"),
            edited,
            "only the request types may differ"
        );
    }

    #[test]
    fn test_matching_file_keeps_every_byte() {
        let dir = tempfile::TempDir::new().unwrap();
        let layout = Layout::new(dir.path(), &GenConfig::default());
        let model = user("user");
        let action = Action::new(Phase::Create).with_payload("UserReq");
        let spec = ServiceSpec::new(&layout, &model, "", &action);
        let patcher = ServicePatcher::new().unwrap();

        assert_eq!(patcher.apply(&spec, false).unwrap(), FileStatus::Created);
        let edited = fs::read_to_string(&spec.path)
            .unwrap()
            .replace("Ok(Default::default())", "// keep me\n        todo!()");
        fs::write(&spec.path, &edited).unwrap();

        assert_eq!(patcher.apply(&spec, false).unwrap(), FileStatus::Unchanged);
        assert_eq!(fs::read(&spec.path).unwrap(), edited.into_bytes());
    }

    #[test]
    fn test_relative_model_import_is_not_stale() {
        let model = user("user");
        let action = Action::new(Phase::Get);
        let src = fresh(&model, &action).replace(
            "use crate::model::user;",
            "use super::super::super::model::user;",
        );
        assert!(src.contains("use super::super::super::model::user;"));
        assert_eq!(patch(&src, &model, &action), None);
    }

    #[test]
    fn test_relative_import_of_moved_model_is_repointed() {
        let action = Action::new(Phase::Get);
        let src = fresh(&user("user"), &action).replace(
            "use crate::model::user;",
            "use super::super::super::model::user;",
        );
        let patched = patch(&src, &user("account"), &action).unwrap();
        assert!(patched.contains("use crate::model::account;"));
        assert!(!patched.contains("super::super::super::model::user"));
    }

    #[test]
    fn test_unparsable_file_is_left_alone() {
        let model = user("user");
        assert_eq!(patch("pub struct {", &model, &Action::new(Phase::Get)), None);
    }

    #[test]
    fn test_missing_base_is_left_alone() {
        let model = user("user");
        let src = "pub struct UserGetter;\n";
        assert_eq!(patch(src, &model, &Action::new(Phase::Get)), None);
    }
}
