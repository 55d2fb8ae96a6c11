//! Absolute project layout derived from [`GenConfig`].

use std::path::{Component, Path, PathBuf};
use strata_core::GenConfig;

/// Name of the generated registration file in each layer root.
pub const REGISTRY_FILE: &str = "registry.rs";

/// Project directories resolved against the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Project root
    pub root: PathBuf,
    /// Framework crate name
    pub framework: String,
    /// Root of generated `use` paths
    pub module: String,
    /// Crate source root
    pub src_dir: PathBuf,
    /// Model layer root
    pub model_dir: PathBuf,
    /// Service layer root
    pub service_dir: PathBuf,
    /// Router layer root
    pub router_dir: PathBuf,
    /// Persistence layer root
    pub dao_dir: PathBuf,
    /// Generated entry point
    pub main_file: PathBuf,
}

impl Layout {
    /// Resolves `config` against `root`.
    #[must_use]
    pub fn new(root: &Path, config: &GenConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            framework: config.framework.clone(),
            module: config.module.clone(),
            src_dir: root.join(&config.src_dir),
            model_dir: root.join(&config.model_dir),
            service_dir: root.join(&config.service_dir),
            router_dir: root.join(&config.router_dir),
            dao_dir: root.join(&config.dao_dir),
            main_file: root.join(&config.main_file),
        }
    }

    /// Module path of a directory, e.g. `crate::model::config`.
    ///
    /// Directories outside the source root contribute their own name only.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_codegen::Layout;
    /// use strata_core::GenConfig;
    /// use std::path::Path;
    ///
    /// let layout = Layout::new(Path::new("/app"), &GenConfig::default());
    /// assert_eq!(layout.module_path_of(Path::new("/app/src/model/config")), "crate::model::config");
    /// assert_eq!(layout.module_path_of(Path::new("/app/src")), "crate");
    /// ```
    #[must_use]
    pub fn module_path_of(&self, dir: &Path) -> String {
        let mut segments = vec![self.module.clone()];
        match dir.strip_prefix(&self.src_dir) {
            Ok(rel) => segments.extend(path_names(rel)),
            Err(_) => segments.extend(dir.file_name().map(|n| n.to_string_lossy().into_owned())),
        }
        segments.join("::")
    }

    /// Module path of a source file, e.g. `crate::model::config::namespace`.
    ///
    /// `mod.rs` names its directory.
    #[must_use]
    pub fn module_path_of_file(&self, file: &Path) -> String {
        let dir = file.parent().unwrap_or(Path::new(""));
        let base = self.module_path_of(dir);
        match module_stem(file) {
            Some(stem) => format!("{base}::{stem}"),
            None => base,
        }
    }

    /// Path relative to the project root, for reports.
    #[must_use]
    pub fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    /// Project-relative path rendered with `/` separators.
    #[must_use]
    pub fn display(&self, path: &Path) -> String {
        path_names(self.relative(path)).collect::<Vec<_>>().join("/")
    }

    /// Name of the layer root's last directory (`service` for `src/service`).
    #[must_use]
    pub fn layer_name(dir: &Path) -> String {
        dir.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Module name a file contributes; `None` for `mod.rs`, `main.rs` and `lib.rs`.
#[must_use]
pub fn module_stem(file: &Path) -> Option<String> {
    let stem = file.file_stem()?.to_string_lossy().into_owned();
    match stem.as_str() {
        "mod" | "main" | "lib" => None,
        _ => Some(stem),
    }
}

/// Normal path components as strings.
pub fn path_names(path: &Path) -> impl Iterator<Item = String> + '_ {
    path.components().filter_map(|c| match c {
        Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
        _ => None,
    })
}
