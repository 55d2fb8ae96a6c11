//! Code generation for strata applications.
//!
//! Discovers model types in an application's source tree, composes their
//! REST endpoints, and derives the registration code, router wiring and
//! service boilerplate the framework needs. Generated registries are
//! rewritten whole; hand-edited service files are patched in place with
//! span-located edits so custom logic survives.
//!
//! # Architecture
//!
//! - [`discovery`]: marker-based model discovery
//! - [`hierarchy`]: endpoint trie and endpoint composition
//! - [`resolver`]: collision-free import aliases
//! - [`synth`]: registry and entry point synthesis
//! - [`patcher`]: fresh and incremental service files
//! - [`pruner`]: stale service file removal
//! - [`pipeline`]: the whole run, in order
//!
//! # Examples
//!
//! ```no_run
//! use strata_codegen::{GenOptions, Pipeline, TomlDesignSource};
//! use strata_codegen::pruner::AssumeNo;
//! use strata_core::ProjectConfig;
//! use std::path::Path;
//!
//! # fn main() -> strata_core::Result<()> {
//! let root = Path::new(".");
//! let config = ProjectConfig::load(root)?;
//! let pipeline = Pipeline::new(root, &config, &TomlDesignSource);
//! let report = pipeline.run(GenOptions::default(), &mut AssumeNo)?;
//! println!("{} file(s) written", report.changed_count());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod design_source;
pub mod discovery;
pub mod hierarchy;
pub mod layout;
pub mod modules;
pub mod patcher;
pub mod pipeline;
pub mod pruner;
pub mod resolver;
pub mod routes;
pub mod synth;
pub mod syntax;
pub mod template_engine;
pub mod types;
pub mod writer;

pub use design_source::{DesignSource, InMemoryDesignSource, TomlDesignSource};
pub use discovery::{Discovery, ModelInfo};
pub use hierarchy::{EndpointTrie, build_hierarchy};
pub use layout::Layout;
pub use patcher::{ServicePatcher, ServiceSpec};
pub use pipeline::{GenOptions, Pipeline};
pub use pruner::{Confirm, PruneReport, Pruner};
pub use routes::{RouteEntry, route_table};
pub use synth::Synthesizer;
pub use types::{FileReport, FileStatus, GenReport, GeneratedFile};
