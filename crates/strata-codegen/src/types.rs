//! Outputs of a generation run.
//!
//! # Examples
//!
//! ```
//! use strata_codegen::{FileReport, FileStatus, GenReport};
//!
//! let mut report = GenReport::new(false);
//! report.push("src/model/registry.rs", FileStatus::Created);
//! report.push("src/main.rs", FileStatus::Unchanged);
//! assert_eq!(report.changed_count(), 1);
//! ```

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// A generated file ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Absolute target path
    pub path: PathBuf,
    /// Formatted content, header included
    pub content: String,
}

/// What happened to one output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// File did not exist and was written
    Created,
    /// File existed and its content changed
    Changed,
    /// File already had the expected content
    Unchanged,
    /// File exists but is hand-written and was left alone
    Skipped,
}

impl FileStatus {
    /// Whether the file was (or, in a dry run, would be) written.
    #[must_use]
    pub const fn is_write(&self) -> bool {
        matches!(self, Self::Created | Self::Changed)
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Created => "created",
            Self::Changed => "changed",
            Self::Unchanged => "unchanged",
            Self::Skipped => "skipped",
        })
    }
}

/// Outcome for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// Project-relative path
    pub path: String,
    /// Outcome
    pub status: FileStatus,
}

/// Summary of a generation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenReport {
    /// Number of discovered models
    pub models: usize,
    /// Per-file outcomes in write order
    pub files: Vec<FileReport>,
    /// Deleted stale files, project-relative
    pub pruned: Vec<String>,
    /// Whether nothing was written
    pub dry_run: bool,
}

impl GenReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// Records the outcome for `path`.
    pub fn push(&mut self, path: impl Into<String>, status: FileStatus) {
        self.files.push(FileReport {
            path: path.into(),
            status,
        });
    }

    /// Number of files created or changed.
    #[must_use]
    pub fn changed_count(&self) -> usize {
        self.files.iter().filter(|f| f.status.is_write()).count()
    }

    /// Outcome recorded for `path`.
    #[must_use]
    pub fn status_of(&self, path: &str) -> Option<FileStatus> {
        self.files.iter().find(|f| f.path == path).map(|f| f.status)
    }
}
