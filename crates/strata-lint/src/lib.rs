//! Architecture and naming checks for strata applications.
//!
//! The linter runs before generation and keeps the source tree in the shape
//! the generator expects: layers that do not import their peers, singular
//! model names, snake_case wire names and module files, and (in projects
//! that depend on the framework) a fixed set of top-level directories.
//!
//! # Examples
//!
//! ```no_run
//! use strata_core::ProjectConfig;
//! use strata_lint::Linter;
//! use std::path::Path;
//!
//! # fn main() -> strata_core::Result<()> {
//! let config = ProjectConfig::default();
//! let report = Linter::new(Path::new("."), &config).run()?;
//! for violation in &report.violations {
//!     eprintln!("{violation}");
//! }
//! std::process::exit(report.exit_code().as_i32());
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod checks;
pub mod linter;
pub mod project;
pub mod report;

pub use linter::Linter;
pub use project::ProjectManifest;
pub use report::{Check, LintReport, Violation};
