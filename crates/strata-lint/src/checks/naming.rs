//! Module and model naming.

use std::path::Path;
use strata_codegen::discovery::is_model_source;
use strata_core::naming::{is_plural, is_snake_case, singular_name};
use syn::ext::IdentExt;
use syn::{Expr, Item, Lit, Meta};

use super::SourceFile;
use crate::report::{Check, Violation};

/// Stems of model-tree files that are not models.
const NON_MODEL_STEMS: &[&str] = &["mod", "registry"];

/// Name a tree entry contributes to the module tree: the directory name,
/// or the stem of a `.rs` file. Other files contribute nothing.
#[must_use]
pub fn module_name(path: &Path, is_dir: bool) -> Option<String> {
    if is_dir {
        return path.file_name().map(|n| n.to_string_lossy().into_owned());
    }
    if path.extension().is_none_or(|ext| ext != "rs") {
        return None;
    }
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}

/// Flags a file or directory under `src/` whose name is not snake_case.
#[must_use]
pub fn check_entry_name(display: &str, path: &Path, is_dir: bool) -> Option<Violation> {
    let name = module_name(path, is_dir)?;
    (!is_snake_case(&name)).then(|| {
        Violation::new(
            Check::ModuleNames,
            format!("{display}: \"{name}\" is not a snake_case module name"),
        )
    })
}

/// Flags a model directory or model file whose name looks plural.
#[must_use]
pub fn check_model_name(
    display: &str,
    path: &Path,
    is_dir: bool,
    allow: &[String],
) -> Option<Violation> {
    if !is_dir && !is_model_source(path) {
        return None;
    }
    let name = module_name(path, is_dir)?;
    if NON_MODEL_STEMS.contains(&name.as_str()) || !is_plural(&name, allow) {
        return None;
    }
    Some(Violation::new(
        Check::Plural,
        format!(
            "{display}: model name \"{name}\" looks plural, use \"{}\"",
            singular_name(&name)
        ),
    ))
}

/// Flags `#[path = ".."]` module declarations whose target is named
/// differently from the module.
#[must_use]
pub fn check_path_attributes(file: &SourceFile) -> Vec<Violation> {
    let mut out = Vec::new();
    path_attributes(file, &file.syntax.items, &mut out);
    out
}

fn path_attributes(file: &SourceFile, items: &[Item], out: &mut Vec<Violation>) {
    for item in items {
        let Item::Mod(m) = item else { continue };
        let module = m.ident.unraw().to_string();
        for target in m.attrs.iter().filter_map(path_value) {
            let target_path = Path::new(&target);
            let stem = match target_path.file_stem().map(|s| s.to_string_lossy()) {
                Some(stem) if stem == "mod" => target_path
                    .parent()
                    .and_then(Path::file_name)
                    .map(|n| n.to_string_lossy().into_owned()),
                stem => stem.map(|s| s.into_owned()),
            };
            if stem.as_deref() != Some(module.as_str()) {
                out.push(Violation::new(
                    Check::ModuleNames,
                    format!(
                        "{}: module `{module}` is loaded from \"{target}\", name the file after the module",
                        file.display
                    ),
                ));
            }
        }
        if let Some((_, items)) = &m.content {
            path_attributes(file, items, out);
        }
    }
}

fn path_value(attr: &syn::Attribute) -> Option<String> {
    if !attr.path().is_ident("path") {
        return None;
    }
    match &attr.meta {
        Meta::NameValue(nv) => match &nv.value {
            Expr::Lit(lit) => match &lit.lit {
                Lit::Str(s) => Some(s.value()),
                _ => None,
            },
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn source(src: &str) -> SourceFile {
        SourceFile {
            path: PathBuf::from("/app/src/service/mod.rs"),
            display: "src/service/mod.rs".to_string(),
            module_path: vec!["crate".into(), "service".into()],
            generated: false,
            syntax: syn::parse_str(src).unwrap(),
        }
    }

    #[test]
    fn test_entry_names() {
        assert!(check_entry_name("a", Path::new("src/model/user_group.rs"), false).is_none());
        assert!(check_entry_name("a", Path::new("src/model/user.design.toml"), false).is_none());
        assert!(check_entry_name("a", Path::new("src/model/README.md"), false).is_none());
        let v = check_entry_name("src/model/UserGroup.rs", Path::new("src/model/UserGroup.rs"), false)
            .unwrap();
        assert_eq!(v.message, "src/model/UserGroup.rs: \"UserGroup\" is not a snake_case module name");
        assert!(check_entry_name("src/api-v2", Path::new("src/api-v2"), true).is_some());
    }

    #[test]
    fn test_model_names() {
        let allow = vec!["settings".to_string()];
        let plural = |p: &str, dir: bool| check_model_name(p, Path::new(p), dir, &allow);
        assert_eq!(
            plural("src/model/users.rs", false).unwrap().message,
            "src/model/users.rs: model name \"users\" looks plural, use \"user\""
        );
        assert!(plural("src/model/user_groups", true).is_some());
        assert!(plural("src/model/settings.rs", false).is_none());
        assert!(plural("src/model/news.rs", false).is_none());
        assert!(plural("src/model/user_tests.rs", false).is_none());
        assert!(plural("src/model/registry.rs", false).is_none());
    }

    #[test]
    fn test_path_attributes() {
        let src = r#"
            #[path = "user_impl.rs"]
            pub mod user;
            #[path = "group/mod.rs"]
            pub mod group;
            #[path = "legacy/mod.rs"]
            mod orders;
            pub mod plain;
            mod inline {
                #[path = "x.rs"]
                mod y;
            }
        "#;
        let messages: Vec<String> = check_path_attributes(&source(src))
            .into_iter()
            .map(|v| v.message)
            .collect();
        assert_eq!(
            messages,
            vec![
                "src/service/mod.rs: module `user` is loaded from \"user_impl.rs\", name the file after the module",
                "src/service/mod.rs: module `orders` is loaded from \"legacy/mod.rs\", name the file after the module",
                "src/service/mod.rs: module `y` is loaded from \"x.rs\", name the file after the module",
            ]
        );
    }
}
