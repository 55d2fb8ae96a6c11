//! Core types, design descriptors, configuration and errors for strata code
//! generation.
//!
//! This crate provides the foundational types shared by the generator, the
//! linter and the CLI.
//!
//! # Architecture
//!
//! - [`design`]: parsed design descriptors (`Design`, `Action`, `Phase`)
//! - [`config`]: project-local `strata.toml`
//! - [`naming`]: case conversion and pluralization heuristics
//! - [`cli`]: output formats and exit codes
//! - Error hierarchy with contextual information

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod error;

pub mod cli;
pub mod config;
pub mod design;
pub mod naming;

pub use config::{GenConfig, LintConfig, ProjectConfig, PruneConfig};
pub use design::{Action, Design, HookShape, Phase};
pub use error::{Error, Result};

/// Header carried by every machine-generated file.
pub const GENERATED_HEADER: &str = "// Code generated by strata-gen. DO NOT EDIT.";

/// Returns `true` if `content` starts with [`GENERATED_HEADER`].
#[must_use]
pub fn is_generated(content: &str) -> bool {
    content.trim_start_matches('\u{feff}').starts_with(GENERATED_HEADER)
}
