//! Project-local configuration.
//!
//! Configuration lives in `strata.toml` at the project root. Every section
//! and key is optional; a missing file yields the defaults. The loaded value
//! is passed explicitly through the pipeline.
//!
//! ```toml
//! [gen]
//! framework = "strata"
//! module = "crate"
//! model_dir = "src/model"
//! service_dir = "src/service"
//! router_dir = "src/router"
//!
//! [prune]
//! ignore = ["^src/service/legacy/", "keep_me.rs"]
//!
//! [lint]
//! plural_allow = ["settings"]
//! allowed_dirs = ["jobs"]
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{Error, Result};

/// File name of the project configuration.
pub const CONFIG_FILE_NAME: &str = "strata.toml";

/// Whole project configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ProjectConfig {
    /// Generator layout settings
    #[serde(default, rename = "gen")]
    pub codegen: GenConfig,

    /// Stale-file pruning settings
    #[serde(default)]
    pub prune: PruneConfig,

    /// Linter settings
    #[serde(default)]
    pub lint: LintConfig,
}

/// Layout of the application source tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GenConfig {
    /// Crate name of the framework generated code calls into
    pub framework: String,

    /// Root used in generated `use` paths (`crate` for a binary crate)
    pub module: String,

    /// Crate source root
    pub src_dir: PathBuf,

    /// Model layer root
    pub model_dir: PathBuf,

    /// Service layer root
    pub service_dir: PathBuf,

    /// Router layer root
    pub router_dir: PathBuf,

    /// Persistence layer root
    pub dao_dir: PathBuf,

    /// Generated process entry point
    pub main_file: PathBuf,
}

/// Pruner settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct PruneConfig {
    /// Patterns protecting stale files from deletion.
    ///
    /// Each entry is tried as a regular expression against the
    /// project-relative path, then as a plain substring.
    pub ignore: Vec<String>,
}

/// Linter settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct LintConfig {
    /// Model names accepted even though they look plural
    pub plural_allow: Vec<String>,

    /// Extra top-level source directories accepted in consumer projects
    pub allowed_dirs: Vec<String>,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            framework: "strata".to_string(),
            module: "crate".to_string(),
            src_dir: PathBuf::from("src"),
            model_dir: PathBuf::from("src/model"),
            service_dir: PathBuf::from("src/service"),
            router_dir: PathBuf::from("src/router"),
            dao_dir: PathBuf::from("src/dao"),
            main_file: PathBuf::from("src/main.rs"),
        }
    }
}

impl ProjectConfig {
    /// Loads `strata.toml` from `project_root`, or the defaults when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, parsed, or
    /// fails [`ProjectConfig::validate`].
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = project_root.join(CONFIG_FILE_NAME);
        if !path.exists() {
            debug!("{} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let config = Self::from_toml(&content)?;
        debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] on malformed TOML or invalid values.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::ConfigError {
            message: format!("failed to parse {CONFIG_FILE_NAME}: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a required value is empty or two layers share a
    /// root directory.
    pub fn validate(&self) -> Result<()> {
        let layout = &self.codegen;
        let is_ident = layout
            .framework
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if layout.framework.is_empty() || !is_ident {
            return Err(Error::ConfigError {
                message: format!(
                    "gen.framework '{}' is not a crate identifier",
                    layout.framework
                ),
            });
        }
        if layout.module.is_empty() {
            return Err(Error::ConfigError {
                message: "gen.module must not be empty".to_string(),
            });
        }

        let layers = [
            ("gen.model_dir", &layout.model_dir),
            ("gen.service_dir", &layout.service_dir),
            ("gen.router_dir", &layout.router_dir),
        ];
        for (key, dir) in layers {
            if dir.as_os_str().is_empty() {
                return Err(Error::ConfigError {
                    message: format!("{key} must not be empty"),
                });
            }
        }
        for (i, (key, dir)) in layers.iter().enumerate() {
            if let Some((other, _)) = layers[i + 1..].iter().find(|(_, d)| d == dir) {
                return Err(Error::ConfigError {
                    message: format!("{key} and {other} point to the same directory"),
                });
            }
        }

        Ok(())
    }
}
