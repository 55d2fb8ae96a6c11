//! Design descriptors: the parsed output of the design DSL.
//!
//! A [`Design`] records which phases of a model are exposed, which of them
//! need hand-written service code, and the payload/result types each phase
//! exchanges. The DSL itself lives elsewhere; this module only holds the
//! parsed values the generators consume.
//!
//! # Examples
//!
//! ```
//! use strata_core::design::{Action, Design, Phase};
//!
//! let mut design = Design::enabled("users");
//! design.add_action("", Action::new(Phase::Create).with_service(true));
//! design.add_action("", Action::new(Phase::List).with_enabled(false));
//!
//! let phases: Vec<_> = design.actions().map(|(_, a)| a.phase).collect();
//! assert_eq!(phases, vec![Phase::Create]);
//! ```

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::naming;

/// One CRUD-family operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Create one record
    Create,
    /// Delete one record
    Delete,
    /// Replace one record
    Update,
    /// Partially update one record
    Patch,
    /// List records
    List,
    /// Fetch one record
    Get,
    /// Create records in batch
    CreateMany,
    /// Delete records in batch
    DeleteMany,
    /// Replace records in batch
    UpdateMany,
    /// Partially update records in batch
    PatchMany,
    /// Import records from an uploaded document
    Import,
    /// Export records as a document
    Export,
}

/// Signature family of a lifecycle hook generated around a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookShape {
    /// `(&self, ctx, m: &mut M)`
    Single,
    /// `(&self, ctx, ms: &mut [M])`
    Many,
    /// `(&self, ctx, ms: &mut Vec<M>)`
    List,
    /// `(&self, ctx)`
    Context,
}

impl Phase {
    /// Every phase in declaration order.
    pub const ALL: [Self; 12] = [
        Self::Create,
        Self::Delete,
        Self::Update,
        Self::Patch,
        Self::List,
        Self::Get,
        Self::CreateMany,
        Self::DeleteMany,
        Self::UpdateMany,
        Self::PatchMany,
        Self::Import,
        Self::Export,
    ];

    /// Snake-case name, also the service method name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Update => "update",
            Self::Patch => "patch",
            Self::List => "list",
            Self::Get => "get",
            Self::CreateMany => "create_many",
            Self::DeleteMany => "delete_many",
            Self::UpdateMany => "update_many",
            Self::PatchMany => "patch_many",
            Self::Import => "import",
            Self::Export => "export",
        }
    }

    /// Variant name used in generated `Phase::X` expressions.
    #[must_use]
    pub const fn variant(&self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Delete => "Delete",
            Self::Update => "Update",
            Self::Patch => "Patch",
            Self::List => "List",
            Self::Get => "Get",
            Self::CreateMany => "CreateMany",
            Self::DeleteMany => "DeleteMany",
            Self::UpdateMany => "UpdateMany",
            Self::PatchMany => "PatchMany",
            Self::Import => "Import",
            Self::Export => "Export",
        }
    }

    /// Suffix of the generated service struct (`UserCreator`).
    #[must_use]
    pub const fn struct_suffix(&self) -> &'static str {
        match self {
            Self::Create => "Creator",
            Self::Delete => "Deleter",
            Self::Update => "Updater",
            Self::Patch => "Patcher",
            Self::List => "Lister",
            Self::Get => "Getter",
            Self::CreateMany => "ManyCreator",
            Self::DeleteMany => "ManyDeleter",
            Self::UpdateMany => "ManyUpdater",
            Self::PatchMany => "ManyPatcher",
            Self::Import => "Importer",
            Self::Export => "Exporter",
        }
    }

    /// Service file name of the phase on the default route.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.rs", self.as_str())
    }

    /// HTTP method the router exposes the phase under.
    #[must_use]
    pub const fn http_method(&self) -> &'static str {
        match self {
            Self::Create | Self::CreateMany | Self::Import => "POST",
            Self::Delete | Self::DeleteMany => "DELETE",
            Self::Update | Self::UpdateMany => "PUT",
            Self::Patch | Self::PatchMany => "PATCH",
            Self::List | Self::Get | Self::Export => "GET",
        }
    }

    /// Path suffix appended to the endpoint.
    #[must_use]
    pub const fn route_suffix(&self) -> &'static str {
        match self {
            Self::Create | Self::List => "",
            Self::Delete | Self::Update | Self::Patch | Self::Get => "/:id",
            Self::CreateMany | Self::DeleteMany | Self::UpdateMany | Self::PatchMany => "/batch",
            Self::Import => "/import",
            Self::Export => "/export",
        }
    }

    /// Shapes of the `before` and `after` hooks.
    #[must_use]
    pub const fn hooks(&self) -> (HookShape, HookShape) {
        match self {
            Self::Create | Self::Delete | Self::Update | Self::Patch | Self::Get => {
                (HookShape::Single, HookShape::Single)
            }
            Self::CreateMany | Self::DeleteMany | Self::UpdateMany | Self::PatchMany => {
                (HookShape::Many, HookShape::Many)
            }
            Self::List | Self::Export => (HookShape::Context, HookShape::List),
            Self::Import => (HookShape::Context, HookShape::Many),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| crate::Error::InvalidArgument(format!("unknown phase '{s}'")))
    }
}

/// Attributes of one phase within a design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    /// Phase this action configures
    pub phase: Phase,
    /// Whether the phase is exposed at all
    pub enabled: bool,
    /// Whether the phase needs hand-written service code
    pub service: bool,
    /// Whether the route skips authentication
    pub public: bool,
    /// Request type; the model type when absent
    pub payload: Option<String>,
    /// Response type; the model type when absent
    pub result: Option<String>,
    /// Service file name overriding the phase default
    pub filename: Option<String>,
}

impl Action {
    /// Creates an enabled action without service code.
    #[must_use]
    pub const fn new(phase: Phase) -> Self {
        Self {
            phase,
            enabled: true,
            service: false,
            public: false,
            payload: None,
            result: None,
            filename: None,
        }
    }

    /// Sets the enabled flag.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the service flag.
    #[must_use]
    pub const fn with_service(mut self, service: bool) -> Self {
        self.service = service;
        self
    }

    /// Sets the public flag.
    #[must_use]
    pub const fn with_public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    /// Sets the payload type.
    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Sets the result type.
    #[must_use]
    pub fn with_result(mut self, result: impl Into<String>) -> Self {
        self.result = Some(result.into());
        self
    }

    /// Payload type, falling back to the model type.
    #[must_use]
    pub fn payload_or<'a>(&'a self, model: &'a str) -> &'a str {
        self.payload.as_deref().unwrap_or(model)
    }

    /// Result type, falling back to the model type.
    #[must_use]
    pub fn result_or<'a>(&'a self, model: &'a str) -> &'a str {
        self.result.as_deref().unwrap_or(model)
    }

    /// File name of the service file implementing this action on `route`.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_core::design::{Action, Phase};
    ///
    /// assert_eq!(Action::new(Phase::CreateMany).service_file_name(""), "create_many.rs");
    /// assert_eq!(Action::new(Phase::Update).service_file_name("restart"), "restart_update.rs");
    /// ```
    #[must_use]
    pub fn service_file_name(&self, route: &str) -> String {
        if let Some(name) = self.filename.as_deref().filter(|n| !n.is_empty()) {
            return if name.ends_with(".rs") {
                name.to_string()
            } else {
                format!("{name}.rs")
            };
        }
        if route.is_empty() {
            self.phase.file_name()
        } else {
            format!("{}_{}", naming::to_snake_case(route), self.phase.file_name())
        }
    }

    /// Name of the service struct implementing this action for `model`.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_core::design::{Action, Phase};
    ///
    /// assert_eq!(Action::new(Phase::Get).service_struct_name("User", ""), "UserGetter");
    /// assert_eq!(
    ///     Action::new(Phase::Create).service_struct_name("User", "login"),
    ///     "UserLoginCreator"
    /// );
    /// ```
    #[must_use]
    pub fn service_struct_name(&self, model: &str, route: &str) -> String {
        format!(
            "{model}{}{}",
            naming::to_pascal_case(route),
            self.phase.struct_suffix()
        )
    }
}

/// Parsed design descriptor of one model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Design {
    /// Whether any route is generated for the model
    pub enabled: bool,
    /// Whether the model is registered for schema migration
    pub migrate: bool,
    /// Endpoint path; empty until declared or composed
    pub endpoint: String,
    /// Route parameter children of this model are nested under
    pub param: Option<String>,
    /// Route (`""` for the default route) to its actions
    pub routes: BTreeMap<String, Vec<Action>>,
}

impl Design {
    /// Creates an enabled design with a custom endpoint and no actions.
    #[must_use]
    pub fn enabled(endpoint: impl Into<String>) -> Self {
        Self {
            enabled: true,
            endpoint: normalize_path(&endpoint.into()),
            ..Self::default()
        }
    }

    /// Adds an action under `route`.
    pub fn add_action(&mut self, route: &str, action: Action) {
        self.routes
            .entry(normalize_path(route))
            .or_default()
            .push(action);
    }

    /// Enabled actions of an enabled design, default route first.
    pub fn actions(&self) -> impl Iterator<Item = (&str, &Action)> {
        self.routes
            .iter()
            .filter(|_| self.enabled)
            .flat_map(|(route, actions)| {
                actions
                    .iter()
                    .filter(|a| a.enabled)
                    .map(move |a| (route.as_str(), a))
            })
    }

    /// Enabled actions that need hand-written service code.
    pub fn service_actions(&self) -> impl Iterator<Item = (&str, &Action)> {
        self.actions().filter(|(_, a)| a.service)
    }

    /// Full route path of `route` under this design's endpoint.
    #[must_use]
    pub fn route_path(&self, route: &str) -> String {
        if route.is_empty() {
            self.endpoint.clone()
        } else if self.endpoint.is_empty() {
            route.to_string()
        } else {
            format!("{}/{route}", self.endpoint)
        }
    }

    /// Declared route parameter, ignoring empty values.
    #[must_use]
    pub fn param(&self) -> Option<&str> {
        self.param.as_deref().filter(|p| !p.is_empty())
    }
}

/// Strips leading and trailing slashes.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    path.trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_round_trip_names() {
        for phase in Phase::ALL {
            assert_eq!(phase.as_str().parse::<Phase>().unwrap(), phase);
        }
        assert!("upsert".parse::<Phase>().is_err());
    }

    #[test]
    fn test_phase_routes() {
        assert_eq!(Phase::Get.http_method(), "GET");
        assert_eq!(Phase::Get.route_suffix(), "/:id");
        assert_eq!(Phase::CreateMany.route_suffix(), "/batch");
        assert_eq!(Phase::Export.hooks(), (HookShape::Context, HookShape::List));
    }

    #[test]
    fn test_disabled_design_emits_nothing() {
        let mut design = Design::enabled("users");
        design.add_action("", Action::new(Phase::Create).with_service(true));
        design.enabled = false;
        assert_eq!(design.actions().count(), 0);
    }

    #[test]
    fn test_service_actions_filter() {
        let mut design = Design::enabled("/users/");
        assert_eq!(design.endpoint, "users");
        design.add_action("", Action::new(Phase::Create).with_service(true));
        design.add_action("", Action::new(Phase::Get));
        design.add_action("/login/", Action::new(Phase::Create).with_service(true));

        let files: Vec<_> = design
            .service_actions()
            .map(|(route, a)| a.service_file_name(route))
            .collect();
        assert_eq!(files, vec!["create.rs", "login_create.rs"]);
    }

    #[test]
    fn test_custom_filename() {
        let mut action = Action::new(Phase::Update);
        action.filename = Some("rotate_keys".to_string());
        assert_eq!(action.service_file_name(""), "rotate_keys.rs");
    }

    #[test]
    fn test_route_path() {
        let design = Design::enabled("config/apps");
        assert_eq!(design.route_path(""), "config/apps");
        assert_eq!(design.route_path("restart"), "config/apps/restart");
    }

    #[test]
    fn test_payload_fallback() {
        let action = Action::new(Phase::Create).with_payload("UserReq");
        assert_eq!(action.payload_or("User"), "UserReq");
        assert_eq!(action.result_or("User"), "User");
    }
}
