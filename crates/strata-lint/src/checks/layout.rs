//! Top-level source directories of consumer projects.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use strata_codegen::Layout;
use strata_core::LintConfig;

use crate::report::{Check, Violation};

/// Top-level `src/` directories every consumer project may have.
pub const DEFAULT_ALLOWED_DIRS: &[&str] = &[
    "bin",
    "config",
    "cronjob",
    "dao",
    "middleware",
    "model",
    "provider",
    "router",
    "service",
    "types",
    "util",
];

/// Directory names accepted directly under `src/`.
///
/// The defaults, the configured extras, and the first component of every
/// configured layer root.
#[must_use]
pub fn allowed_dirs(layout: &Layout, config: &LintConfig) -> BTreeSet<String> {
    let layers = [
        &layout.model_dir,
        &layout.service_dir,
        &layout.router_dir,
        &layout.dao_dir,
    ];
    DEFAULT_ALLOWED_DIRS
        .iter()
        .map(|d| (*d).to_string())
        .chain(config.allowed_dirs.iter().cloned())
        .chain(layers.into_iter().filter_map(|dir| top_level(&layout.src_dir, dir)))
        .collect()
}

fn top_level(src_dir: &Path, dir: &Path) -> Option<String> {
    dir.strip_prefix(src_dir)
        .ok()?
        .components()
        .next()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
}

/// Flags every directory in `dirs` missing from `allowed`.
#[must_use]
pub fn check(layout: &Layout, dirs: &[PathBuf], allowed: &BTreeSet<String>) -> Vec<Violation> {
    dirs.iter()
        .filter_map(|dir| {
            let name = dir.file_name()?.to_string_lossy().into_owned();
            (!allowed.contains(&name)).then(|| {
                Violation::new(
                    Check::Layout,
                    format!(
                        "{}: top-level directory \"{name}\" is not allowed, expected one of: {}",
                        layout.display(dir),
                        allowed.iter().cloned().collect::<Vec<_>>().join(", ")
                    ),
                )
            })
        })
        .collect()
}
