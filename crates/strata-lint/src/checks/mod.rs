//! Individual checks.
//!
//! Per-file checks take a parsed [`SourceFile`]; tree checks take the
//! directory listing. Each returns the violations it found.

pub mod layering;
pub mod layout;
pub mod naming;
pub mod tags;

use std::path::PathBuf;

/// A parsed source file and where it sits in the module tree.
#[derive(Debug)]
pub struct SourceFile {
    /// Absolute path
    pub path: PathBuf,
    /// Project-relative path for messages
    pub display: String,
    /// Module path segments, e.g. `["crate", "service", "user", "create"]`
    pub module_path: Vec<String>,
    /// Whether the file carries the generated header
    pub generated: bool,
    /// Syntax tree
    pub syntax: syn::File,
}

impl SourceFile {
    /// Module path of the directory holding this file.
    ///
    /// For `mod.rs` that is the file's own module.
    #[must_use]
    pub fn package(&self) -> &[String] {
        let is_mod_rs = self.path.file_name().is_some_and(|n| n == "mod.rs");
        if is_mod_rs {
            &self.module_path
        } else {
            &self.module_path[..self.module_path.len().saturating_sub(1)]
        }
    }
}
