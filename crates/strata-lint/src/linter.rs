//! The lint run over one project.

use std::fs;
use std::path::{Path, PathBuf};
use strata_codegen::Layout;
use strata_codegen::syntax::parse_source;
use strata_core::{Error, LintConfig, ProjectConfig, Result, is_generated};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::checks::layering::Layer;
use crate::checks::{SourceFile, layering, layout as top_dirs_check, naming, tags};
use crate::project::ProjectManifest;
use crate::report::{Check, LintReport, Violation};

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &["target", "tests"];

/// Runs every check over a project's source tree.
#[derive(Debug)]
pub struct Linter<'a> {
    layout: Layout,
    config: &'a LintConfig,
    manifest: Option<ProjectManifest>,
}

impl<'a> Linter<'a> {
    /// Creates a linter for the project at `root`.
    #[must_use]
    pub fn new(root: &Path, config: &'a ProjectConfig) -> Self {
        Self {
            layout: Layout::new(root, &config.codegen),
            config: &config.lint,
            manifest: None,
        }
    }

    /// Uses `manifest` instead of reading the project's `Cargo.toml`.
    #[must_use]
    pub fn with_manifest(mut self, manifest: ProjectManifest) -> Self {
        self.manifest = Some(manifest);
        self
    }

    /// Runs all checks.
    ///
    /// Files that fail to parse are reported as violations, not errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the source tree cannot be walked, a file cannot
    /// be read, or the project manifest is malformed.
    pub fn run(&self) -> Result<LintReport> {
        let layout = &self.layout;
        let mut report = LintReport::default();

        let manifest = match &self.manifest {
            Some(manifest) => Some(manifest.clone()),
            None => ProjectManifest::load(&layout.root)?,
        };
        report.consumer = manifest
            .as_ref()
            .is_some_and(|m| m.is_consumer_of(&layout.framework));

        if !layout.src_dir.is_dir() {
            debug!("no source directory at {}", layout.display(&layout.src_dir));
            return Ok(report);
        }

        let layers = Layer::of(layout);
        let mut top_dirs = Vec::new();
        for (path, is_dir) in self.walk()? {
            let display = layout.display(&path);
            report.extend(naming::check_entry_name(&display, &path, is_dir));
            if path.starts_with(&layout.model_dir) && path != layout.model_dir {
                report.extend(naming::check_model_name(
                    &display,
                    &path,
                    is_dir,
                    &self.config.plural_allow,
                ));
            }
            if is_dir {
                if path.parent() == Some(layout.src_dir.as_path()) {
                    top_dirs.push(path);
                }
                continue;
            }
            if path.extension().is_none_or(|ext| ext != "rs") {
                continue;
            }

            report.files_checked += 1;
            if let Some(file) = self.load(&path, display, &mut report)? {
                report.extend(layering::check(&file, &layers, layout));
                report.extend(tags::check(&file));
                report.extend(naming::check_path_attributes(&file));
            }
        }

        if report.consumer {
            let allowed = top_dirs_check::allowed_dirs(layout, self.config);
            report.extend(top_dirs_check::check(layout, &top_dirs, &allowed));
        }

        info!(
            "linted {} file(s), {} violation(s)",
            report.files_checked,
            report.violations.len()
        );
        Ok(report)
    }

    /// Every entry under the source root, sorted, with whether it is a
    /// directory. Hidden and build directories are skipped.
    fn walk(&self) -> Result<Vec<(PathBuf, bool)>> {
        let src_dir = &self.layout.src_dir;
        let walker = WalkDir::new(src_dir)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                let name = e.file_name().to_string_lossy();
                !name.starts_with('.')
                    && !(e.file_type().is_dir() && SKIPPED_DIRS.contains(&&*name))
            });
        let mut entries = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(src_dir).to_path_buf();
                Error::io(path, e.into())
            })?;
            entries.push((entry.path().to_path_buf(), entry.file_type().is_dir()));
        }
        Ok(entries)
    }

    /// Reads and parses one file. A syntax error is reported and yields
    /// `None`.
    fn load(
        &self,
        path: &Path,
        display: String,
        report: &mut LintReport,
    ) -> Result<Option<SourceFile>> {
        let src = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let syntax = match parse_source(path, &src) {
            Ok(syntax) => syntax,
            Err(Error::Parse { message, .. }) => {
                report.extend([Violation::new(Check::Parse, format!("{display}: {message}"))]);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        let module_path = self
            .layout
            .module_path_of_file(path)
            .split("::")
            .map(str::to_string)
            .collect();
        Ok(Some(SourceFile {
            path: path.to_path_buf(),
            display,
            module_path,
            generated: is_generated(&src),
            syntax,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn manifest(consumer: bool) -> ProjectManifest {
        let deps = if consumer { "strata = \"0.1\"\n" } else { "" };
        ProjectManifest::from_cargo_toml(&format!("[package]\nname = \"shop\"\n[dependencies]\n{deps}"))
            .unwrap()
    }

    #[test]
    fn test_missing_source_dir_is_clean() {
        let dir = TempDir::new().unwrap();
        let config = ProjectConfig::default();
        let report = Linter::new(dir.path(), &config)
            .with_manifest(manifest(true))
            .run()
            .unwrap();
        assert!(report.is_clean());
        assert_eq!(report.files_checked, 0);
        assert!(report.consumer);
    }

    #[test]
    fn test_parse_failure_is_a_violation() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/model/user.rs", "pub struct User {");
        write(dir.path(), "src/model/group.rs", "pub struct Group;");
        let config = ProjectConfig::default();
        let report = Linter::new(dir.path(), &config)
            .with_manifest(manifest(false))
            .run()
            .unwrap();
        assert_eq!(report.files_checked, 2);
        assert_eq!(report.count(Check::Parse), 1);
        assert!(report.violations[0].message.starts_with("src/model/user.rs: "));
    }

    #[test]
    fn test_layout_only_for_consumers() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/handlers/mod.rs", "");
        write(dir.path(), "src/.cache/x.rs", "fn {");
        write(dir.path(), "src/target/x.rs", "fn {");
        let config = ProjectConfig::default();

        let framework = Linter::new(dir.path(), &config)
            .with_manifest(manifest(false))
            .run()
            .unwrap();
        assert!(framework.is_clean());

        let app = Linter::new(dir.path(), &config)
            .with_manifest(manifest(true))
            .run()
            .unwrap();
        assert_eq!(app.count(Check::Layout), 1);
        assert_eq!(app.violations.len(), 1);
    }
}
