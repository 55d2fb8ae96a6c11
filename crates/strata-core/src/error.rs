//! Error types for strata code generation.
//!
//! Every library crate in the workspace returns [`Error`]; the CLI wraps it in
//! `anyhow` at command boundaries.
//!
//! # Examples
//!
//! ```
//! use strata_core::{Error, Result};
//!
//! fn require_endpoint(endpoint: &str) -> Result<()> {
//!     if endpoint.starts_with('/') {
//!         return Err(Error::InvalidArgument(format!(
//!             "endpoint '{endpoint}' must not start with '/'"
//!         )));
//!     }
//!     Ok(())
//! }
//!
//! assert!(require_endpoint("/users").is_err());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for strata code generation.
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem operation failed.
    ///
    /// Raised for permission problems, missing directories and failed
    /// writes. Always aborts the run.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path the operation was applied to
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A Rust source file could not be parsed.
    #[error("failed to parse {}: {message}", path.display())]
    Parse {
        /// File that failed to parse
        path: PathBuf,
        /// Parser message, including the location when known
        message: String,
    },

    /// Project configuration is invalid.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// A design descriptor could not be read.
    #[error("invalid design descriptor {}: {message}", path.display())]
    Design {
        /// Descriptor file
        path: PathBuf,
        /// Description of the problem
        message: String,
    },

    /// Two enabled models resolve to the same endpoint path.
    #[error("endpoint collision at '{path}': {first} and {second}")]
    EndpointCollision {
        /// Model path both models claim
        path: String,
        /// First model (qualified type name)
        first: String,
        /// Second model (qualified type name)
        second: String,
    },

    /// Template registration or rendering failed.
    #[error("Template error: {message}")]
    Template {
        /// Description of the failure
        message: String,
    },

    /// Generated code did not parse back as Rust.
    #[error("generated invalid Rust code for {target}: {message}")]
    Codegen {
        /// What was being generated
        target: String,
        /// Parser message
        message: String,
    },

    /// Invalid argument error.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Wraps an I/O error with the path it happened at.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_core::Error;
    /// use std::io;
    ///
    /// let err = Error::io("src/model", io::Error::from(io::ErrorKind::NotFound));
    /// assert!(err.is_io());
    /// ```
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if this is a filesystem error.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns `true` if this is a source parse error.
    #[must_use]
    pub const fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    /// Returns `true` if this is a configuration error.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_core::Error;
    ///
    /// let err = Error::ConfigError {
    ///     message: "gen.model_dir is empty".to_string(),
    /// };
    /// assert!(err.is_config_error());
    /// ```
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError { .. })
    }

    /// Returns `true` if this is a design descriptor error.
    #[must_use]
    pub const fn is_design_error(&self) -> bool {
        matches!(self, Self::Design { .. })
    }

    /// Returns `true` if this is an endpoint collision.
    #[must_use]
    pub const fn is_endpoint_collision(&self) -> bool {
        matches!(self, Self::EndpointCollision { .. })
    }
}

/// Result type alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;
