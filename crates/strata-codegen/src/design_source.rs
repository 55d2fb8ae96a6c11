//! Loading design descriptors.
//!
//! The generators consume [`Design`] values; where they come from is behind
//! [`DesignSource`]. The default source reads a TOML sidecar next to each
//! model file (`namespace.rs` → `namespace.design.toml`) holding one table
//! per model type:
//!
//! ```toml
//! [Namespace]
//! endpoint = "namespaces"
//! param = "ns"
//! migrate = true
//!
//! [Namespace.create]
//! service = true
//! payload = "NamespaceReq"
//!
//! [Namespace.get]
//! public = true
//!
//! [Namespace.routes.restart.update]
//! service = true
//! ```

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use strata_core::design::normalize_path;
use strata_core::{Action, Design, Error, Phase, Result};
use tracing::{debug, warn};

/// Extension of descriptor sidecar files.
pub const DESIGN_EXTENSION: &str = "design.toml";

/// Supplies the design of each model type.
pub trait DesignSource: fmt::Debug {
    /// Designs declared for the types of `model_file`, keyed by type name.
    ///
    /// # Errors
    ///
    /// Returns an error if a descriptor exists but cannot be read.
    fn designs_for(&self, model_file: &Path) -> Result<BTreeMap<String, Design>>;
}

/// Reads `<stem>.design.toml` sidecars.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlDesignSource;

impl TomlDesignSource {
    /// Sidecar path of a model file.
    #[must_use]
    pub fn sidecar_path(model_file: &Path) -> PathBuf {
        model_file.with_extension(DESIGN_EXTENSION)
    }

    /// Parses descriptor text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Design`] naming `path` on malformed input.
    pub fn parse(path: &Path, content: &str) -> Result<BTreeMap<String, Design>> {
        let raw: BTreeMap<String, RawDesign> =
            toml::from_str(content).map_err(|e| Error::Design {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(raw
            .into_iter()
            .map(|(type_name, design)| {
                for key in design.unknown_keys() {
                    warn!(
                        "{}: [{type_name}.{key}] is not a known phase, ignoring it",
                        path.display()
                    );
                }
                (type_name, design.into_design())
            })
            .collect())
    }
}

impl DesignSource for TomlDesignSource {
    fn designs_for(&self, model_file: &Path) -> Result<BTreeMap<String, Design>> {
        let path = Self::sidecar_path(model_file);
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let designs = Self::parse(&path, &content)?;
        debug!("loaded {} design(s) from {}", designs.len(), path.display());
        Ok(designs)
    }
}

/// Designs held in memory, keyed by type name regardless of file.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDesignSource {
    designs: HashMap<String, Design>,
}

impl InMemoryDesignSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the design of `type_name`.
    #[must_use]
    pub fn with(mut self, type_name: impl Into<String>, design: Design) -> Self {
        self.designs.insert(type_name.into(), design);
        self
    }
}

impl DesignSource for InMemoryDesignSource {
    fn designs_for(&self, _model_file: &Path) -> Result<BTreeMap<String, Design>> {
        Ok(self
            .designs
            .iter()
            .map(|(name, design)| (name.clone(), design.clone()))
            .collect())
    }
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct RawDesign {
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default)]
    migrate: bool,
    #[serde(default)]
    endpoint: String,
    #[serde(default)]
    param: Option<String>,
    #[serde(default)]
    routes: BTreeMap<String, RawPhases>,
    #[serde(flatten)]
    phases: RawPhases,
}

#[derive(Debug, Default, Deserialize)]
struct RawPhases {
    #[serde(default)]
    create: Option<RawAction>,
    #[serde(default)]
    delete: Option<RawAction>,
    #[serde(default)]
    update: Option<RawAction>,
    #[serde(default)]
    patch: Option<RawAction>,
    #[serde(default)]
    list: Option<RawAction>,
    #[serde(default)]
    get: Option<RawAction>,
    #[serde(default)]
    create_many: Option<RawAction>,
    #[serde(default)]
    delete_many: Option<RawAction>,
    #[serde(default)]
    update_many: Option<RawAction>,
    #[serde(default)]
    patch_many: Option<RawAction>,
    #[serde(default)]
    import: Option<RawAction>,
    #[serde(default)]
    export: Option<RawAction>,
    #[serde(flatten)]
    unknown: BTreeMap<String, toml::Value>,
}

impl RawPhases {
    const fn get(&self, phase: Phase) -> Option<&RawAction> {
        match phase {
            Phase::Create => self.create.as_ref(),
            Phase::Delete => self.delete.as_ref(),
            Phase::Update => self.update.as_ref(),
            Phase::Patch => self.patch.as_ref(),
            Phase::List => self.list.as_ref(),
            Phase::Get => self.get.as_ref(),
            Phase::CreateMany => self.create_many.as_ref(),
            Phase::DeleteMany => self.delete_many.as_ref(),
            Phase::UpdateMany => self.update_many.as_ref(),
            Phase::PatchMany => self.patch_many.as_ref(),
            Phase::Import => self.import.as_ref(),
            Phase::Export => self.export.as_ref(),
        }
    }

    fn actions(&self) -> impl Iterator<Item = Action> + '_ {
        Phase::ALL
            .into_iter()
            .filter_map(|phase| self.get(phase).map(|raw| raw.to_action(phase)))
    }
}

#[derive(Debug, Deserialize)]
struct RawAction {
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default)]
    service: bool,
    #[serde(default)]
    public: bool,
    #[serde(default)]
    payload: Option<String>,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    filename: Option<String>,
}

impl RawAction {
    fn to_action(&self, phase: Phase) -> Action {
        Action {
            phase,
            enabled: self.enabled,
            service: self.service,
            public: self.public,
            payload: self.payload.clone().filter(|p| !p.is_empty()),
            result: self.result.clone().filter(|r| !r.is_empty()),
            filename: self.filename.clone(),
        }
    }
}

impl RawDesign {
    /// Keys that name no phase, with route tables prefixed `routes.<route>.`.
    fn unknown_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.phases.unknown.keys().cloned().collect();
        for (route, phases) in &self.routes {
            keys.extend(phases.unknown.keys().map(|key| format!("routes.{route}.{key}")));
        }
        keys
    }

    fn into_design(self) -> Design {
        let mut design = Design {
            enabled: self.enabled,
            migrate: self.migrate,
            endpoint: normalize_path(&self.endpoint),
            param: self.param,
            routes: BTreeMap::new(),
        };
        for action in self.phases.actions() {
            design.add_action("", action);
        }
        for (route, phases) in &self.routes {
            for action in phases.actions() {
                design.add_action(route, action);
            }
        }
        design
    }
}
