//! Stale service file pruning.
//!
//! A service file becomes stale when the design that required it changes
//! (a phase loses its service flag, a model is renamed or removed). The
//! pruner compares a snapshot taken before the run with the files the
//! current models require, filters the difference through the configured
//! ignore patterns and, after confirmation, deletes what is left.
//!
//! Only files named like a phase file (`create.rs`, `restart_update.rs`)
//! are ever candidates; hand-added helpers are never touched.

use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use strata_core::{Error, Phase, PruneConfig, Result};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::layout::{Layout, module_stem};
use crate::modules::{Removal, module_file_of, remove_declaration};

/// Upper bound on empty-directory sweeps.
const MAX_SWEEPS: usize = 16;

/// Asks whether stale files may be deleted.
pub trait Confirm {
    /// Returns `true` to delete `candidates`.
    fn confirm(&mut self, candidates: &[PathBuf]) -> bool;
}

/// Answers yes without asking.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _candidates: &[PathBuf]) -> bool {
        true
    }
}

/// Answers no without asking.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeNo;

impl Confirm for AssumeNo {
    fn confirm(&mut self, _candidates: &[PathBuf]) -> bool {
        false
    }
}

/// Whether `name` is a service file name some phase produces.
#[must_use]
pub fn is_phase_file_name(name: &str) -> bool {
    Phase::ALL.iter().any(|phase| {
        let file = phase.file_name();
        name == file
            || name
                .strip_suffix(file.as_str())
                .is_some_and(|route| route.ends_with('_'))
    })
}

/// Existing phase-named files under the service root.
///
/// # Errors
///
/// Returns [`Error::Io`] if the tree cannot be walked.
pub fn snapshot_service_files(service_dir: &Path) -> Result<BTreeSet<PathBuf>> {
    let mut files = BTreeSet::new();
    if !service_dir.is_dir() {
        return Ok(files);
    }
    for entry in WalkDir::new(service_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(service_dir).to_path_buf();
            Error::io(path, e.into())
        })?;
        let is_phase_file =
            entry.file_type().is_file() && is_phase_file_name(&entry.file_name().to_string_lossy());
        if is_phase_file {
            files.insert(entry.into_path());
        }
    }
    debug!("{} service file(s) before generation", files.len());
    Ok(files)
}

/// Matches project-relative paths against `prune.ignore`.
///
/// Each pattern is tried as a regular expression; a pattern that does not
/// compile, or does not match, is then tried as a plain substring.
#[derive(Debug, Clone, Default)]
pub struct IgnoreMatcher {
    patterns: Vec<(String, Option<Regex>)>,
}

impl IgnoreMatcher {
    /// Compiles `patterns`.
    #[must_use]
    pub fn new(patterns: &[String]) -> Self {
        let patterns = patterns
            .iter()
            .map(|p| {
                let re = Regex::new(p)
                    .inspect_err(|e| debug!("ignore pattern '{p}' used as substring: {e}"))
                    .ok();
                (p.clone(), re)
            })
            .collect();
        Self { patterns }
    }

    /// Whether `path` is protected.
    #[must_use]
    pub fn is_ignored(&self, path: &str) -> bool {
        self.patterns
            .iter()
            .any(|(raw, re)| re.as_ref().is_some_and(|re| re.is_match(path)) || path.contains(raw))
    }
}

/// Outcome of a prune.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Deleted files (or, in a dry run, files that would be deleted)
    pub deleted: Vec<PathBuf>,
    /// Removed empty directories
    pub removed_dirs: Vec<PathBuf>,
    /// Whether confirmation was refused
    pub declined: bool,
}

/// Deletes service files no model requires anymore.
#[derive(Debug)]
pub struct Pruner<'a> {
    layout: &'a Layout,
    ignore: IgnoreMatcher,
}

impl<'a> Pruner<'a> {
    /// Creates a pruner for `layout` honoring `config.ignore`.
    #[must_use]
    pub fn new(layout: &'a Layout, config: &PruneConfig) -> Self {
        Self {
            layout,
            ignore: IgnoreMatcher::new(&config.ignore),
        }
    }

    /// Files in `existing` that are not `required` and not ignored.
    #[must_use]
    pub fn candidates(
        &self,
        existing: &BTreeSet<PathBuf>,
        required: &BTreeSet<PathBuf>,
    ) -> Vec<PathBuf> {
        existing
            .difference(required)
            .filter(|path| {
                let shown = self.layout.display(path);
                let ignored = self.ignore.is_ignored(&shown);
                if ignored {
                    debug!("{shown} is stale but ignored");
                }
                !ignored
            })
            .cloned()
            .collect()
    }

    /// Deletes `candidates` once `confirm` agrees, then sweeps directories
    /// left empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if a file or directory cannot be removed.
    pub fn prune(
        &self,
        candidates: &[PathBuf],
        confirm: &mut dyn Confirm,
        dry_run: bool,
    ) -> Result<PruneReport> {
        let mut report = PruneReport::default();
        if candidates.is_empty() {
            return Ok(report);
        }
        if !confirm.confirm(candidates) {
            info!("pruning declined, {} stale file(s) kept", candidates.len());
            report.declined = true;
            return Ok(report);
        }
        if dry_run {
            report.deleted = candidates.to_vec();
            return Ok(report);
        }

        for path in candidates {
            match fs::remove_file(path) {
                Ok(()) => info!("deleted {}", self.layout.display(path)),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(Error::io(path, e)),
            }
            if let Some(name) = module_stem(path) {
                self.undeclare(path, &name)?;
            }
            report.deleted.push(path.clone());
        }

        report.removed_dirs = self.sweep_empty_dirs()?;
        Ok(report)
    }

    /// Removes the declaration of `path` from its parent module file,
    /// deleting a `mod.rs` that ends up empty.
    fn undeclare(&self, path: &Path, name: &str) -> Result<()> {
        let Some(dir) = path.parent() else {
            return Ok(());
        };
        let Some(module_file) = module_file_of(dir) else {
            return Ok(());
        };
        let removal = remove_declaration(&module_file, name, false)?;
        let is_nested_mod_rs = module_file.file_name().is_some_and(|n| n == "mod.rs")
            && dir != self.layout.service_dir
            && dir.starts_with(&self.layout.service_dir);
        if removal == Removal::Emptied && is_nested_mod_rs {
            fs::remove_file(&module_file).map_err(|e| Error::io(&module_file, e))?;
            debug!("deleted emptied {}", self.layout.display(&module_file));
        }
        Ok(())
    }

    fn sweep_empty_dirs(&self) -> Result<Vec<PathBuf>> {
        let root = &self.layout.service_dir;
        let mut removed = Vec::new();
        for sweep in 0..MAX_SWEEPS {
            let empty: Vec<PathBuf> = WalkDir::new(root)
                .min_depth(1)
                .contents_first(true)
                .into_iter()
                .filter_map(std::result::Result::ok)
                .filter(|e| e.file_type().is_dir())
                .map(walkdir::DirEntry::into_path)
                .filter(|dir| fs::read_dir(dir).is_ok_and(|mut it| it.next().is_none()))
                .collect();
            if empty.is_empty() {
                debug!("directory sweep settled after {sweep} pass(es)");
                return Ok(removed);
            }
            for dir in empty {
                fs::remove_dir(&dir).map_err(|e| Error::io(&dir, e))?;
                info!("removed empty directory {}", self.layout.display(&dir));
                // a sibling `<dir>.rs` still backs the declaration
                let backed = dir.with_extension("rs").is_file();
                if let Some(name) = dir.file_name().map(|n| n.to_string_lossy().into_owned())
                    && !backed
                {
                    self.undeclare(&dir, &name)?;
                }
                removed.push(dir);
            }
        }
        warn!("stopped sweeping empty directories after {MAX_SWEEPS} passes");
        Ok(removed)
    }
}
