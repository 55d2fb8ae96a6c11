//! Model discovery.
//!
//! Walks the model tree and records every struct carrying a field of the
//! framework's marker type (`strata::model::Base` or `strata::model::Empty`),
//! however the marker's module was imported or renamed.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use strata_core::naming::{to_snake_case, var_name};
use strata_core::{Action, Design, Error, Result};
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use crate::design_source::DesignSource;
use crate::layout::{Layout, REGISTRY_FILE, module_stem, path_names};
use crate::syntax::{UseMap, parse_source};

/// Type names recognised as the model marker.
pub const MARKER_TYPES: [&str; 2] = ["Base", "Empty"];

/// A discovered model type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    /// Directory holding the defining file
    pub dir: PathBuf,
    /// Defining file
    pub file_path: PathBuf,
    /// Directory of the defining file relative to the model root
    pub rel_dir: PathBuf,
    /// Full module path of the defining file
    pub package_path: String,
    /// Last segment of [`ModelInfo::package_path`]
    pub package_name: String,
    /// Slash-joined module path relative to the model root
    pub model_path: String,
    /// Struct name
    pub type_name: String,
    /// Short variable name used in generated hooks
    pub var_name: String,
    /// Design, with the composed endpoint once the hierarchy is built
    pub design: Design,
}

impl ModelInfo {
    /// `package::Type` as written in messages.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.package_path, self.type_name)
    }

    /// Directory of this model's service files relative to the service root.
    #[must_use]
    pub fn service_rel_dir(&self) -> PathBuf {
        self.rel_dir.join(to_snake_case(&self.type_name))
    }

    /// Service file implementing `action` on `route`.
    #[must_use]
    pub fn service_file(&self, service_root: &Path, route: &str, action: &Action) -> PathBuf {
        service_root
            .join(self.service_rel_dir())
            .join(action.service_file_name(route))
    }
}

/// Finds model types under a model root.
#[derive(Debug)]
pub struct Discovery<'a> {
    layout: &'a Layout,
    designs: &'a dyn DesignSource,
}

impl<'a> Discovery<'a> {
    /// Creates a discovery pass over `layout` reading designs from `designs`.
    #[must_use]
    pub fn new(layout: &'a Layout, designs: &'a dyn DesignSource) -> Self {
        Self { layout, designs }
    }

    /// Discovers the models under `root`, which may be a directory or a
    /// single file.
    ///
    /// Results are sorted by file path, then type name. Files that fail to
    /// parse are skipped with a warning; the linter reports them.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree cannot be walked or a design descriptor
    /// is malformed.
    pub fn discover(&self, root: &Path) -> Result<Vec<ModelInfo>> {
        let (base, files) = if root.is_file() {
            let base = root.parent().unwrap_or(Path::new("")).to_path_buf();
            (base, vec![root.to_path_buf()])
        } else {
            (root.to_path_buf(), self.source_files(root)?)
        };

        let mut models = Vec::new();
        for file in files {
            models.extend(self.discover_file(&base, &file)?);
        }
        models.sort_by(|a, b| {
            a.file_path
                .cmp(&b.file_path)
                .then_with(|| a.type_name.cmp(&b.type_name))
        });
        debug!("discovered {} model(s) under {}", models.len(), root.display());
        Ok(models)
    }

    fn source_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let registry = root.join(REGISTRY_FILE);
        let mut files = Vec::new();
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !(e.file_type().is_dir() && e.file_name() == "tests"));
        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                Error::io(path, e.into())
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() || !is_model_source(path) || path == registry {
                continue;
            }
            files.push(path.to_path_buf());
        }
        Ok(files)
    }

    fn discover_file(&self, base: &Path, file: &Path) -> Result<Vec<ModelInfo>> {
        let content = fs::read_to_string(file).map_err(|e| Error::io(file, e))?;
        let parsed = match parse_source(file, &content) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("skipping {}: {e}", file.display());
                return Ok(Vec::new());
            }
        };

        let rel_dir = file
            .parent()
            .and_then(|d| d.strip_prefix(base).ok())
            .unwrap_or(Path::new(""))
            .to_path_buf();
        let mut segments: Vec<String> = path_names(&rel_dir).collect();
        segments.extend(module_stem(file));
        if segments.is_empty() {
            trace!("{} is the model root module", file.display());
            return Ok(Vec::new());
        }

        let uses = UseMap::from_file(&parsed);
        let types: Vec<String> = parsed
            .items
            .iter()
            .filter_map(|item| match item {
                syn::Item::Struct(s) if has_marker(s, &uses, &self.layout.framework) => {
                    Some(s.ident.to_string())
                }
                _ => None,
            })
            .collect();
        if types.is_empty() {
            return Ok(Vec::new());
        }

        let mut designs = self.designs.designs_for(file)?;
        let package_path = self.layout.module_path_of_file(file);
        let package_name = package_path
            .rsplit("::")
            .next()
            .unwrap_or_default()
            .to_string();
        let model_path = segments.join("/");

        Ok(types
            .into_iter()
            .map(|type_name| {
                let design = designs.remove(&type_name).unwrap_or_default();
                trace!("model {package_path}::{type_name} at {model_path}");
                ModelInfo {
                    dir: file.parent().unwrap_or(Path::new("")).to_path_buf(),
                    file_path: file.to_path_buf(),
                    rel_dir: rel_dir.clone(),
                    package_path: package_path.clone(),
                    package_name: package_name.clone(),
                    model_path: model_path.clone(),
                    var_name: var_name(&type_name),
                    type_name,
                    design,
                }
            })
            .collect())
    }
}

/// Whether `path` is a non-test Rust source file.
#[must_use]
pub fn is_model_source(path: &Path) -> bool {
    if path.extension().is_none_or(|ext| ext != "rs") {
        return false;
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    stem != "tests" && !stem.ends_with("_test") && !stem.ends_with("_tests")
}

/// Whether a struct declares a field of the framework's marker type.
///
/// The field type is resolved through the file's imports, so
/// `model::Base`, a renamed `sm::Empty`, a directly imported `Base` and a
/// fully qualified `strata::model::Base` all match.
#[must_use]
pub fn has_marker(item: &syn::ItemStruct, uses: &UseMap, framework: &str) -> bool {
    item.fields.iter().any(|field| {
        let syn::Type::Path(ty) = &field.ty else {
            return false;
        };
        if ty.qself.is_some() {
            return false;
        }
        let resolved = uses.resolve_path(&ty.path);
        matches!(
            resolved.as_slice(),
            [fw, module, marker]
                if fw == framework && module == "model" && MARKER_TYPES.contains(&marker.as_str())
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design_source::TomlDesignSource;
    use strata_core::GenConfig;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn marker(src: &str) -> bool {
        let file: syn::File = syn::parse_str(src).unwrap();
        let uses = UseMap::from_file(&file);
        file.items.iter().any(|item| match item {
            syn::Item::Struct(s) => has_marker(s, &uses, "strata"),
            _ => false,
        })
    }

    #[test]
    fn test_marker_import_forms() {
        assert!(marker("use strata::model;\npub struct A { base: model::Base }"));
        assert!(marker("use strata::model as sm;\npub struct A { e: sm::Empty }"));
        assert!(marker("use strata::model::Base;\npub struct A { b: Base }"));
        assert!(marker("pub struct A { b: strata::model::Base }"));
        assert!(!marker("use other::model;\npub struct A { b: model::Base }"));
        assert!(!marker("use strata::model;\npub struct A { b: model::Other }"));
        assert!(marker("pub struct A(strata::model::Base);"));
    }

    #[test]
    fn test_discover_tree() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(
            root,
            "src/model/config/namespace.rs",
            "use strata::model;\npub struct Namespace { pub base: model::Base }\n",
        );
        write(
            root,
            "src/model/config/namespace.design.toml",
            "[Namespace]\nendpoint = \"namespaces\"\n",
        );
        write(root, "src/model/user.rs", "use strata::model;\npub struct User { pub base: model::Base }\npub struct Plain;\n");
        write(root, "src/model/user_test.rs", "use strata::model;\npub struct Fake { pub base: model::Base }\n");
        write(root, "src/model/registry.rs", "use strata::model;\npub struct Nope { pub base: model::Base }\n");
        write(root, "src/model/mod.rs", "pub mod config;\npub mod user;\n");

        let layout = Layout::new(root, &GenConfig::default());
        let models = Discovery::new(&layout, &TomlDesignSource)
            .discover(&layout.model_dir)
            .unwrap();

        let names: Vec<_> = models.iter().map(|m| m.type_name.as_str()).collect();
        assert_eq!(names, vec!["Namespace", "User"]);

        let ns = &models[0];
        assert_eq!(ns.package_path, "crate::model::config::namespace");
        assert_eq!(ns.package_name, "namespace");
        assert_eq!(ns.model_path, "config/namespace");
        assert_eq!(ns.var_name, "n");
        assert!(ns.design.enabled);
        assert_eq!(ns.design.endpoint, "namespaces");
        assert_eq!(ns.service_rel_dir(), PathBuf::from("config/namespace"));

        let user = &models[1];
        assert!(!user.design.enabled);
        assert_eq!(user.model_path, "user");
    }

    #[test]
    fn test_discover_single_file() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/model/user.rs", "use strata::model::Empty;\npub struct User { e: Empty }\n");
        let layout = Layout::new(dir.path(), &GenConfig::default());
        let models = Discovery::new(&layout, &TomlDesignSource)
            .discover(&layout.model_dir.join("user.rs"))
            .unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].model_path, "user");
        assert_eq!(models[0].package_path, "crate::model::user");
    }

    #[test]
    fn test_unparsable_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/model/broken.rs", "pub struct {");
        let layout = Layout::new(dir.path(), &GenConfig::default());
        let models = Discovery::new(&layout, &TomlDesignSource)
            .discover(&layout.model_dir)
            .unwrap();
        assert!(models.is_empty());
    }

    #[test]
    fn test_malformed_design_aborts() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/model/user.rs", "use strata::model;\npub struct User { b: model::Base }\n");
        write(dir.path(), "src/model/user.design.toml", "[User\n");
        let layout = Layout::new(dir.path(), &GenConfig::default());
        let err = Discovery::new(&layout, &TomlDesignSource)
            .discover(&layout.model_dir)
            .unwrap_err();
        assert!(err.is_design_error());
    }

    #[test]
    fn test_is_model_source() {
        assert!(is_model_source(Path::new("src/model/user.rs")));
        assert!(!is_model_source(Path::new("src/model/user_test.rs")));
        assert!(!is_model_source(Path::new("src/model/tests.rs")));
        assert!(!is_model_source(Path::new("src/model/user.design.toml")));
    }
}
