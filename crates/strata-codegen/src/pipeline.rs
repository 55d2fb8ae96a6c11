//! The generation run.
//!
//! Order of work:
//!
//! 1. snapshot the phase-named service files already on disk;
//! 2. discover models and compose their endpoints;
//! 3. synthesize the three registries and the entry point;
//! 4. create or patch one service file per service action;
//! 5. declare every written file in its parent module;
//! 6. optionally prune service files no model requires anymore.
//!
//! Linting is the caller's job and happens before [`Pipeline::run`].

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use strata_core::{Error, ProjectConfig, Result, is_generated};
use tracing::{debug, info, warn};

use crate::design_source::DesignSource;
use crate::discovery::{Discovery, ModelInfo};
use crate::hierarchy::build_hierarchy;
use crate::layout::Layout;
use crate::modules::ensure_declared;
use crate::patcher::{ServicePatcher, ServiceSpec};
use crate::pruner::{Confirm, Pruner, snapshot_service_files};
use crate::routes::{RouteEntry, route_table};
use crate::synth::Synthesizer;
use crate::types::{FileStatus, GenReport, GeneratedFile};
use crate::writer::write_if_changed;

/// Switches for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenOptions {
    /// Delete stale service files after generation
    pub prune: bool,
    /// Compute every outcome without touching the disk
    pub dry_run: bool,
}

/// Generation over one project.
#[derive(Debug)]
pub struct Pipeline<'a> {
    layout: Layout,
    config: &'a ProjectConfig,
    designs: &'a dyn DesignSource,
}

impl<'a> Pipeline<'a> {
    /// Creates a pipeline for the project at `root`.
    #[must_use]
    pub fn new(root: &Path, config: &'a ProjectConfig, designs: &'a dyn DesignSource) -> Self {
        Self {
            layout: Layout::new(root, &config.codegen),
            config,
            designs,
        }
    }

    /// Resolved project layout.
    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Discovered models with composed endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if the model tree cannot be read, a descriptor is
    /// malformed or two enabled models collide.
    pub fn discover(&self) -> Result<Vec<ModelInfo>> {
        let mut models =
            Discovery::new(&self.layout, self.designs).discover(&self.layout.model_dir)?;
        build_hierarchy(&mut models)?;
        Ok(models)
    }

    /// Route table of the current models.
    ///
    /// # Errors
    ///
    /// Same as [`Pipeline::discover`].
    pub fn routes(&self) -> Result<Vec<RouteEntry>> {
        Ok(route_table(&self.discover()?))
    }

    /// Runs generation.
    ///
    /// # Errors
    ///
    /// Returns the first filesystem, descriptor, collision or code
    /// generation error. Files written before it stay written; running
    /// again converges.
    pub fn run(&self, options: GenOptions, confirm: &mut dyn Confirm) -> Result<GenReport> {
        let layout = &self.layout;
        let mut report = GenReport::new(options.dry_run);

        let existing = snapshot_service_files(&layout.service_dir)?;
        let models = self.discover()?;
        report.models = models.len();
        if models.is_empty() {
            info!(
                "no models under {}, nothing to do",
                layout.display(&layout.model_dir)
            );
            return Ok(report);
        }

        let synth = Synthesizer::new(layout);
        let registries = [
            synth.model_registry(&models)?,
            synth.service_registry(&models)?,
            synth.router_registry(&models)?,
        ];
        let main = synth.main_file(&synth.top_level_modules()?)?;
        for file in registries.iter().chain(std::iter::once(&main)) {
            let status = emit(file, options.dry_run)?;
            report.push(layout.display(&file.path), status);
        }

        let patcher = ServicePatcher::new()?;
        let mut required = BTreeSet::new();
        for model in &models {
            for (route, action) in model.design.service_actions() {
                let spec = ServiceSpec::new(layout, model, route, action);
                let status = patcher.apply(&spec, options.dry_run)?;
                report.push(layout.display(&spec.path), status);
                required.insert(spec.path);
            }
        }

        let declared: Vec<&PathBuf> = registries
            .iter()
            .map(|f| &f.path)
            .chain(required.iter())
            .collect();
        for file in declared {
            for (module_file, status) in ensure_declared(file, &layout.src_dir, options.dry_run)? {
                let shown = layout.display(&module_file);
                if report.status_of(&shown).is_none() {
                    report.push(shown, status);
                }
            }
        }

        if options.prune {
            let pruner = Pruner::new(layout, &self.config.prune);
            let candidates = pruner.candidates(&existing, &required);
            for path in &candidates {
                info!("stale: {}", layout.display(path));
            }
            let pruned = pruner.prune(&candidates, confirm, options.dry_run)?;
            report.pruned = pruned.deleted.iter().map(|p| layout.display(p)).collect();
        }

        info!(
            "{} model(s), {} file(s) written, {} pruned",
            report.models,
            report.changed_count(),
            report.pruned.len()
        );
        Ok(report)
    }
}

/// Writes a generated file unless a hand-written file holds its place.
fn emit(file: &GeneratedFile, dry_run: bool) -> Result<FileStatus> {
    match fs::read_to_string(&file.path) {
        Ok(existing) if !is_generated(&existing) => {
            warn!(
                "{} exists without the generated header, leaving it alone",
                file.path.display()
            );
            Ok(FileStatus::Skipped)
        }
        Ok(_) => write_if_changed(&file.path, &file.content, dry_run),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("creating {}", file.path.display());
            write_if_changed(&file.path, &file.content, dry_run)
        }
        Err(e) => Err(Error::io(&file.path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design_source::InMemoryDesignSource;
    use crate::pruner::AssumeYes;
    use strata_core::{Action, Design, Phase};
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let model = dir.path().join("src/model/user.rs");
        fs::create_dir_all(model.parent().unwrap()).unwrap();
        fs::write(
            &model,
            "use strata::model;\n\npub struct User {\n    pub base: model::Base,\n}\n",
        )
        .unwrap();
        dir
    }

    fn designs() -> InMemoryDesignSource {
        let mut design = Design::enabled("users");
        design.migrate = true;
        design.add_action("", Action::new(Phase::Create).with_service(true));
        design.add_action("", Action::new(Phase::List));
        InMemoryDesignSource::new().with("User", design)
    }

    #[test]
    fn test_first_run_creates_everything() {
        let dir = project();
        let config = ProjectConfig::default();
        let designs = designs();
        let pipeline = Pipeline::new(dir.path(), &config, &designs);

        let report = pipeline.run(GenOptions::default(), &mut AssumeYes).unwrap();
        assert_eq!(report.models, 1);
        for path in [
            "src/model/registry.rs",
            "src/service/registry.rs",
            "src/router/registry.rs",
            "src/main.rs",
            "src/service/user/create.rs",
            "src/service/user/mod.rs",
            "src/model/mod.rs",
        ] {
            assert_eq!(report.status_of(path), Some(FileStatus::Created), "{path}");
        }
        assert_eq!(
            fs::read_to_string(dir.path().join("src/service/mod.rs")).unwrap(),
            "pub mod registry;\npub mod user;\n"
        );
    }

    #[test]
    fn test_hand_written_main_is_skipped() {
        let dir = project();
        let main = dir.path().join("src/main.rs");
        fs::write(&main, "fn main() {}\n").unwrap();
        let config = ProjectConfig::default();
        let designs = designs();
        let pipeline = Pipeline::new(dir.path(), &config, &designs);

        let report = pipeline.run(GenOptions::default(), &mut AssumeYes).unwrap();
        assert_eq!(report.status_of("src/main.rs"), Some(FileStatus::Skipped));
        assert_eq!(fs::read_to_string(&main).unwrap(), "fn main() {}\n");
    }

    #[test]
    fn test_no_models_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let config = ProjectConfig::default();
        let designs = InMemoryDesignSource::new();
        let pipeline = Pipeline::new(dir.path(), &config, &designs);
        let report = pipeline.run(GenOptions::default(), &mut AssumeYes).unwrap();
        assert_eq!(report.models, 0);
        assert!(report.files.is_empty());
        assert!(!dir.path().join("src/main.rs").exists());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = project();
        let config = ProjectConfig::default();
        let designs = designs();
        let pipeline = Pipeline::new(dir.path(), &config, &designs);
        let options = GenOptions {
            prune: true,
            dry_run: true,
        };
        let report = pipeline.run(options, &mut AssumeYes).unwrap();
        assert!(report.dry_run);
        assert!(report.changed_count() > 0);
        assert!(!dir.path().join("src/main.rs").exists());
        assert!(!dir.path().join("src/service").exists());
    }
}
