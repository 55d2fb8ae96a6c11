//! Command implementations for `strata-gen`.
//!
//! Each command loads the project, does its work through the library
//! crates and prints the result in the requested format.

pub mod check;
pub mod common;
pub mod completions;
pub mod generate;
pub mod routes;
