//! Layer isolation.
//!
//! A file under a layer root (service, dao, model) must not import its own
//! layer's root module or anything below it: service code does not call
//! other services, models do not reach into other models. The framework's
//! own layer module (`strata::service`) is allowed, and so is a package that
//! merely shares the layer's name elsewhere (`crate::model::service`).
//! Imports within the file's own directory module, and of the file's own
//! submodules, are allowed. Relative paths are resolved against the file's
//! module path first. Generated files are exempt.

use std::path::{Path, PathBuf};
use strata_codegen::Layout;
use strata_codegen::syntax::{UseMap, absolute_path};
use tracing::trace;

use super::SourceFile;
use crate::report::{Check, Violation};

/// A layer root and the module segment naming it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    /// Segment name, e.g. `service`
    pub name: String,
    /// Root directory
    pub root: PathBuf,
}

impl Layer {
    /// The service, dao and model layers of `layout`.
    #[must_use]
    pub fn of(layout: &Layout) -> Vec<Self> {
        [&layout.service_dir, &layout.dao_dir, &layout.model_dir]
            .into_iter()
            .map(|root| Self {
                name: Layout::layer_name(root),
                root: root.clone(),
            })
            .filter(|layer| !layer.name.is_empty())
            .collect()
    }

    fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
    }
}

/// Checks the imports of `file` against the layer it lives in.
#[must_use]
pub fn check(file: &SourceFile, layers: &[Layer], layout: &Layout) -> Vec<Violation> {
    let Some(layer) = layers.iter().find(|l| l.contains(&file.path)) else {
        return Vec::new();
    };
    if file.generated {
        trace!("{} is generated, skipping layering", file.display);
        return Vec::new();
    }

    let crate_root: Vec<String> = layout.module.split("::").map(str::to_string).collect();
    let layer_module: Vec<String> = layout
        .module_path_of(&layer.root)
        .split("::")
        .map(str::to_string)
        .collect();
    let package = file.package();

    UseMap::from_file(&file.syntax)
        .import_paths()
        .into_iter()
        .filter_map(|written| {
            let resolved = absolute_path(&written, &file.module_path, &crate_root);
            let own_child = is_below(&resolved, &file.module_path);
            let sibling = package != layer_module.as_slice() && is_below(&resolved, package);
            let framework_layer = resolved.len() >= 2
                && resolved[0] == layout.framework
                && resolved[1] == layer.name;
            let crosses = resolved.starts_with(&layer_module);
            (crosses && !own_child && !sibling && !framework_layer).then(|| {
                Violation::new(
                    Check::Layering,
                    format!(
                        "{}: {} layer must not import \"{}\"",
                        file.display,
                        layer.name,
                        written.join("::")
                    ),
                )
            })
        })
        .collect()
}

fn is_below(path: &[String], prefix: &[String]) -> bool {
    !prefix.is_empty() && path.len() > prefix.len() && path.starts_with(prefix)
}
