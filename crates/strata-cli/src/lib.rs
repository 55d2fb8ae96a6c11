//! Library half of the `strata-gen` command line tool.
//!
//! Commands and formatters live here so they can be tested without
//! spawning the binary.

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod commands;
pub mod formatters;
