//! Package manifest of the linted project.
//!
//! The layout check only applies to projects that consume the framework.
//! That is decided from the project's own package name and its declared
//! dependencies, read once per lint run from `cargo metadata --no-deps`,
//! or from a plain `Cargo.toml` scan when cargo is unavailable.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use strata_core::{Error, Result};
use tracing::debug;

/// Name and dependencies of the project's package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectManifest {
    /// Package name, `None` for a virtual workspace manifest
    pub package: Option<String>,
    /// Names of the normal dependencies, as published
    pub dependencies: BTreeSet<String>,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    packages: Vec<MetadataPackage>,
}

#[derive(Debug, Deserialize)]
struct MetadataPackage {
    name: String,
    manifest_path: PathBuf,
    #[serde(default)]
    dependencies: Vec<MetadataDependency>,
}

#[derive(Debug, Deserialize)]
struct MetadataDependency {
    name: String,
    #[serde(default)]
    kind: Option<String>,
}

impl ProjectManifest {
    /// Reads the manifest of the project at `root`.
    ///
    /// Returns `Ok(None)` when the project has no `Cargo.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if `Cargo.toml` exists but cannot be read or parsed.
    pub fn load(root: &Path) -> Result<Option<Self>> {
        let manifest_path = root.join("Cargo.toml");
        let content = match fs::read_to_string(&manifest_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no Cargo.toml under {}", root.display());
                return Ok(None);
            }
            Err(e) => return Err(Error::io(&manifest_path, e)),
        };

        if let Some(manifest) = Self::from_cargo_metadata(&manifest_path) {
            return Ok(Some(manifest));
        }
        Self::from_cargo_toml(&content).map(Some)
    }

    fn from_cargo_metadata(manifest_path: &Path) -> Option<Self> {
        let cargo = std::env::var_os("CARGO").unwrap_or_else(|| OsString::from("cargo"));
        let output = Command::new(cargo)
            .args(["metadata", "--format-version", "1", "--no-deps", "--offline"])
            .arg("--manifest-path")
            .arg(manifest_path)
            .output();
        match output {
            Ok(out) if out.status.success() => {
                let json = String::from_utf8_lossy(&out.stdout);
                Self::from_metadata_json(&json, manifest_path)
            }
            Ok(out) => {
                debug!(
                    "cargo metadata failed, scanning Cargo.toml: {}",
                    String::from_utf8_lossy(&out.stderr).trim()
                );
                None
            }
            Err(e) => {
                debug!("cargo not runnable, scanning Cargo.toml: {e}");
                None
            }
        }
    }

    /// Parses `cargo metadata --format-version 1` output.
    ///
    /// Picks the package whose manifest is `manifest_path`, else the first
    /// workspace member. Dev and build dependencies are ignored.
    #[must_use]
    pub fn from_metadata_json(json: &str, manifest_path: &Path) -> Option<Self> {
        let metadata: Metadata = match serde_json::from_str(json) {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!("unreadable cargo metadata: {e}");
                return None;
            }
        };
        let canonical = manifest_path.canonicalize().ok();
        let index = metadata
            .packages
            .iter()
            .position(|p| {
                p.manifest_path == manifest_path
                    || canonical.as_ref().is_some_and(|c| *c == p.manifest_path)
            })
            .unwrap_or(0);
        let package = metadata.packages.into_iter().nth(index)?;
        Some(Self {
            package: Some(package.name),
            dependencies: package
                .dependencies
                .into_iter()
                .filter(|d| d.kind.is_none())
                .map(|d| d.name)
                .collect(),
        })
    }

    /// Scans a `Cargo.toml` for the package name and its dependencies.
    ///
    /// A renamed dependency (`alias = { package = "real" }`) counts under
    /// its published name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the manifest is malformed.
    pub fn from_cargo_toml(content: &str) -> Result<Self> {
        let table: toml::Table = content.parse().map_err(|e: toml::de::Error| Error::Parse {
            path: PathBuf::from("Cargo.toml"),
            message: e.to_string(),
        })?;
        let package = table
            .get("package")
            .and_then(|p| p.get("name"))
            .and_then(toml::Value::as_str)
            .map(str::to_string);
        let dependencies = table
            .get("dependencies")
            .and_then(toml::Value::as_table)
            .map(|deps| {
                deps.iter()
                    .map(|(key, value)| {
                        value
                            .get("package")
                            .and_then(toml::Value::as_str)
                            .unwrap_or(key.as_str())
                            .to_string()
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(Self {
            package,
            dependencies,
        })
    }

    /// Whether this package depends on `framework` without being it.
    ///
    /// Names compare with `-` and `_` treated alike.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_lint::ProjectManifest;
    ///
    /// let app = ProjectManifest::from_cargo_toml(
    ///     "[package]\nname = \"shop\"\n[dependencies]\nstrata = \"0.3\"\n",
    /// ).unwrap();
    /// assert!(app.is_consumer_of("strata"));
    ///
    /// let framework = ProjectManifest::from_cargo_toml("[package]\nname = \"strata\"\n").unwrap();
    /// assert!(!framework.is_consumer_of("strata"));
    /// ```
    #[must_use]
    pub fn is_consumer_of(&self, framework: &str) -> bool {
        let framework = crate_ident(framework);
        if self.package.as_deref().is_some_and(|p| crate_ident(p) == framework) {
            return false;
        }
        self.dependencies.iter().any(|d| crate_ident(d) == framework)
    }
}

fn crate_ident(name: &str) -> String {
    name.replace('-', "_")
}
