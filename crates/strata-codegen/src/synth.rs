//! Source synthesis for registration files and the entry point.
//!
//! Each file is built as a token tree, parsed back into a [`syn::File`] and
//! printed with `prettyplease`, so the output is valid and canonically
//! formatted before it is compared with what is on disk. Every file holds
//! exactly one function; when its body would be empty the import block is
//! dropped too.

use proc_macro2::TokenStream;
use quote::quote;
use std::fs;
use std::path::Path;
use strata_core::{Action, Error, GENERATED_HEADER, Result};

use crate::discovery::ModelInfo;
use crate::layout::{Layout, REGISTRY_FILE};
use crate::resolver::Imports;
use crate::syntax::qualify_type;
use crate::types::GeneratedFile;

/// Prints a token tree as a generated Rust file.
///
/// # Errors
///
/// Returns [`Error::Codegen`] if `tokens` is not a valid file.
pub fn format_file(tokens: TokenStream, target: &str) -> Result<String> {
    let file = syn::parse2::<syn::File>(tokens).map_err(|e| Error::Codegen {
        target: target.to_string(),
        message: e.to_string(),
    })?;
    Ok(format!("{GENERATED_HEADER}\n\n{}", prettyplease::unparse(&file)))
}

fn parse_path(path: &str) -> Result<syn::Path> {
    syn::parse_str(path).map_err(|e| Error::Codegen {
        target: path.to_string(),
        message: e.to_string(),
    })
}

/// Builds the generated files of a project.
#[derive(Debug)]
pub struct Synthesizer<'a> {
    layout: &'a Layout,
}

impl<'a> Synthesizer<'a> {
    /// Creates a synthesizer for `layout`.
    #[must_use]
    pub const fn new(layout: &'a Layout) -> Self {
        Self { layout }
    }

    fn framework_path(&self, module: &str) -> String {
        format!("{}::{module}", self.layout.framework)
    }

    fn finish(&self, path: &Path, tokens: TokenStream) -> Result<GeneratedFile> {
        let content = format_file(tokens, &self.layout.display(path))?;
        Ok(GeneratedFile {
            path: path.to_path_buf(),
            content,
        })
    }

    /// Model registration: one call per model whose design asks for
    /// migration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Codegen`] if a model path is not valid Rust.
    pub fn model_registry(&self, models: &[ModelInfo]) -> Result<GeneratedFile> {
        let path = self.layout.model_dir.join(REGISTRY_FILE);
        let migrated: Vec<&ModelInfo> = models.iter().filter(|m| m.design.migrate).collect();
        if migrated.is_empty() {
            return self.finish(&path, quote! { pub fn init() {} });
        }

        let model_mod = self.framework_path("model");
        let imports = Imports::from_paths(
            std::iter::once(model_mod.clone()).chain(migrated.iter().map(|m| m.package_path.clone())),
        );
        let uses = imports.use_items()?;
        let model = parse_path(&imports.local_name(&model_mod))?;
        let calls = migrated
            .iter()
            .map(|m| {
                let ty = parse_path(&format!(
                    "{}::{}",
                    imports.local_name(&m.package_path),
                    m.type_name
                ))?;
                Ok(quote! { #model::register::<#ty>(); })
            })
            .collect::<Result<Vec<_>>>()?;

        self.finish(
            &path,
            quote! {
                #(#uses)*

                pub fn init() {
                    #(#calls)*
                }
            },
        )
    }

    /// Service registration: one call per action needing service code.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Codegen`] if a module path is not valid Rust.
    pub fn service_registry(&self, models: &[ModelInfo]) -> Result<GeneratedFile> {
        let path = self.layout.service_dir.join(REGISTRY_FILE);
        let entries: Vec<(String, String, &str, &Action)> = models
            .iter()
            .flat_map(|m| {
                m.design.service_actions().map(move |(route, action)| {
                    let file = m.service_file(&self.layout.service_dir, route, action);
                    let module = self.layout.module_path_of_file(&file);
                    let name = action.service_struct_name(&m.type_name, route);
                    (module, name, route, action)
                })
            })
            .collect();
        if entries.is_empty() {
            return self.finish(&path, quote! { pub fn init() {} });
        }

        let service_mod = self.framework_path("service");
        let types_mod = self.framework_path("types");
        let imports = Imports::from_paths(
            [service_mod.clone(), types_mod.clone()]
                .into_iter()
                .chain(entries.iter().map(|(module, ..)| module.clone())),
        );
        let uses = imports.use_items()?;
        let service = parse_path(&imports.local_name(&service_mod))?;
        let types = parse_path(&imports.local_name(&types_mod))?;
        let calls = entries
            .iter()
            .map(|(module, name, route, action)| {
                let ty = parse_path(&format!("{}::{name}", imports.local_name(module)))?;
                let phase = parse_path(&format!("Phase::{}", action.phase.variant()))?;
                Ok(if route.is_empty() {
                    quote! { #service::register::<#ty>(#types::#phase); }
                } else {
                    quote! { #service::register_route::<#ty>(#route, #types::#phase); }
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.finish(
            &path,
            quote! {
                #(#uses)*

                pub fn init() {
                    #(#calls)*
                }
            },
        )
    }

    /// Router registration: one call per enabled action, with its full
    /// path, request and response types and auth mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Codegen`] if a declared payload or result type is
    /// not a valid Rust type.
    pub fn router_registry(&self, models: &[ModelInfo]) -> Result<GeneratedFile> {
        let path = self.layout.router_dir.join(REGISTRY_FILE);
        let framework = parse_path(&self.layout.framework)?;
        let routed: Vec<(&ModelInfo, &str, &Action)> = models
            .iter()
            .flat_map(|m| m.design.actions().map(move |(route, action)| (m, route, action)))
            .collect();
        if routed.is_empty() {
            return self.finish(
                &path,
                quote! {
                    pub fn init() -> #framework::Result<()> {
                        Ok(())
                    }
                },
            );
        }

        let router_mod = self.framework_path("router");
        let types_mod = self.framework_path("types");
        let imports = Imports::from_paths(
            [router_mod.clone(), types_mod.clone()]
                .into_iter()
                .chain(routed.iter().map(|(m, ..)| m.package_path.clone())),
        );
        let uses = imports.use_items()?;
        let router = parse_path(&imports.local_name(&router_mod))?;
        let types = parse_path(&imports.local_name(&types_mod))?;
        let calls = routed
            .iter()
            .map(|(m, route, action)| {
                let alias = imports.local_name(&m.package_path);
                let model = qualify_type(&m.type_name, &alias, &[])?;
                let req = qualify_type(action.payload_or(&m.type_name), &alias, &[])?;
                let rsp = qualify_type(action.result_or(&m.type_name), &alias, &[])?;
                let route_path = m.design.route_path(route);
                let phase = parse_path(&format!("Phase::{}", action.phase.variant()))?;
                let auth = if action.public {
                    quote! { #router::public() }
                } else {
                    quote! { #router::auth() }
                };
                Ok(quote! {
                    #router::register::<#model, #req, #rsp>(#auth, #route_path, #types::#phase)?;
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.finish(
            &path,
            quote! {
                #(#uses)*

                pub fn init() -> #framework::Result<()> {
                    #(#calls)*
                    Ok(())
                }
            },
        )
    }

    /// Process entry point: bootstrap, registrations, then the run loop.
    ///
    /// For a binary crate (`module = "crate"`) the top-level modules in
    /// `modules` are declared too.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Codegen`] if a module name is not a valid identifier.
    pub fn main_file(&self, modules: &[String]) -> Result<GeneratedFile> {
        let framework = parse_path(&self.layout.framework)?;
        let declarations = if self.layout.module == "crate" {
            modules
                .iter()
                .map(|name| {
                    let ident: syn::Ident = syn::parse_str(name).map_err(|e| Error::Codegen {
                        target: name.clone(),
                        message: e.to_string(),
                    })?;
                    Ok(quote! { mod #ident; })
                })
                .collect::<Result<Vec<_>>>()?
        } else {
            Vec::new()
        };

        let init = |dir: &Path| {
            parse_path(&format!("{}::registry::init", self.layout.module_path_of(dir)))
        };
        let model_init = init(&self.layout.model_dir)?;
        let service_init = init(&self.layout.service_dir)?;
        let router_init = init(&self.layout.router_dir)?;

        self.finish(
            &self.layout.main_file,
            quote! {
                #(#declarations)*

                use #framework::bootstrap;

                fn main() -> #framework::Result<()> {
                    bootstrap::init()?;
                    #model_init();
                    #service_init();
                    #router_init()?;
                    bootstrap::run()
                }
            },
        )
    }

    /// Top-level modules of the source root the entry point declares.
    ///
    /// Includes every `.rs` file and every directory holding a `mod.rs`,
    /// plus the layer roots even before they exist on disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the source root cannot be listed.
    pub fn top_level_modules(&self) -> Result<Vec<String>> {
        let src = &self.layout.src_dir;
        let mut modules = std::collections::BTreeSet::new();
        for dir in [
            &self.layout.model_dir,
            &self.layout.service_dir,
            &self.layout.router_dir,
        ] {
            if let Some(first) = dir
                .strip_prefix(src)
                .ok()
                .and_then(|rel| crate::layout::path_names(rel).next())
            {
                modules.insert(first.trim_end_matches(".rs").to_string());
            }
        }

        let entries = match fs::read_dir(src) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(modules.into_iter().collect());
            }
            Err(e) => return Err(Error::io(src, e)),
        };
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(src, e))?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            if path.is_dir() {
                if path.join("mod.rs").is_file() && name != "bin" {
                    modules.insert(name);
                }
            } else if let Some(stem) = name.strip_suffix(".rs") {
                if path != self.layout.main_file && stem != "lib" && stem != "main" {
                    modules.insert(stem.to_string());
                }
            }
        }
        Ok(modules.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use strata_core::{Design, GenConfig, Phase};

    fn layout() -> Layout {
        Layout::new(Path::new("/app"), &GenConfig::default())
    }

    /// Drops whitespace and trailing commas so line wrapping does not matter.
    fn squash(s: &str) -> String {
        s.chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .replace(",)", ")")
            .replace(",>", ">")
    }

    fn model(rel: &str, type_name: &str, design: Design) -> ModelInfo {
        let file = PathBuf::from(format!("/app/src/model/{rel}.rs"));
        let rel_dir = Path::new(rel).parent().unwrap().to_path_buf();
        ModelInfo {
            dir: file.parent().unwrap().to_path_buf(),
            package_path: format!("crate::model::{}", rel.replace('/', "::")),
            package_name: rel.rsplit('/').next().unwrap().to_string(),
            file_path: file,
            rel_dir,
            model_path: rel.to_string(),
            type_name: type_name.to_string(),
            var_name: "m".to_string(),
            design,
        }
    }

    #[test]
    fn test_empty_registry_has_no_imports() {
        let layout = layout();
        let file = Synthesizer::new(&layout).model_registry(&[]).unwrap();
        assert!(file.content.starts_with(GENERATED_HEADER));
        assert!(!file.content.contains("use "));
        assert!(file.content.contains("pub fn init() {}"));
    }

    #[test]
    fn test_model_registry_aliases_collisions() {
        let layout = layout();
        let mut a = Design::enabled("");
        a.migrate = true;
        let models = vec![
            model("admin/user", "AdminUser", a.clone()),
            model("user", "User", a),
            model("team", "Team", Design::enabled("")),
        ];
        let file = Synthesizer::new(&layout).model_registry(&models).unwrap();
        assert!(file.content.contains("use crate::model::admin::user as admin_user;"));
        assert!(file.content.contains("use crate::model::user as model_user;"));
        assert!(file.content.contains("model::register::<admin_user::AdminUser>();"));
        assert!(file.content.contains("model::register::<model_user::User>();"));
        assert!(!file.content.contains("Team"));
    }

    #[test]
    fn test_router_registry() {
        let layout = layout();
        let mut design = Design::enabled("users");
        design.add_action("", Action::new(Phase::Create).with_payload("UserReq"));
        design.add_action("", Action::new(Phase::Get).with_public(true));
        design.add_action("", Action::new(Phase::Delete).with_enabled(false));
        let models = vec![model("user", "User", design)];

        let file = Synthesizer::new(&layout).router_registry(&models).unwrap();
        let content = squash(&file.content);
        assert!(content.contains("pubfninit()->strata::Result<()>"));
        assert!(content.contains(
            "router::register::<user::User,user::UserReq,user::User>(router::auth(),\"users\",types::Phase::Create)?;"
        ));
        assert!(content.contains("router::public(),\"users\",types::Phase::Get"));
        assert!(!content.contains("Phase::Delete"));
    }

    #[test]
    fn test_service_registry_custom_route() {
        let layout = layout();
        let mut design = Design::enabled("users");
        design.add_action("", Action::new(Phase::Create).with_service(true));
        design.add_action("login", Action::new(Phase::Create).with_service(true));
        design.add_action("", Action::new(Phase::List));
        let models = vec![model("user", "User", design)];

        let file = Synthesizer::new(&layout).service_registry(&models).unwrap();
        assert!(file.content.contains("use crate::service::user::create;"));
        let content = squash(&file.content);
        assert!(content.contains("service::register::<create::UserCreator>(types::Phase::Create);"));
        assert!(content.contains(
            "service::register_route::<login_create::UserLoginCreator>(\"login\",types::Phase::Create);"
        ));
        assert!(!content.contains("Lister"));
    }

    #[test]
    fn test_main_file_order() {
        let layout = layout();
        let modules = vec!["model".to_string(), "router".to_string(), "service".to_string()];
        let file = Synthesizer::new(&layout).main_file(&modules).unwrap();
        let content = &file.content;
        assert!(content.contains("mod model;"));
        let order: Vec<usize> = [
            "bootstrap::init()?",
            "crate::model::registry::init()",
            "crate::service::registry::init()",
            "crate::router::registry::init()?",
            "bootstrap::run()",
        ]
        .iter()
        .map(|needle| content.find(needle).unwrap())
        .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_output_is_stable() {
        let layout = layout();
        let mut design = Design::enabled("users");
        design.add_action("", Action::new(Phase::Get));
        let models = vec![model("user", "User", design)];
        let synth = Synthesizer::new(&layout);
        assert_eq!(
            synth.router_registry(&models).unwrap(),
            synth.router_registry(&models).unwrap()
        );
    }
}
