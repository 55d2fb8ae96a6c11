//! Route table derived from composed endpoints.

use serde::Serialize;
use strata_core::Phase;

use crate::discovery::ModelInfo;

/// One HTTP route the router registry exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    /// HTTP method
    pub method: &'static str,
    /// Absolute path, e.g. `/config/namespaces/:ns/apps/:id`
    pub path: String,
    /// Phase served
    pub phase: Phase,
    /// Whether authentication is skipped
    pub public: bool,
    /// Qualified model type
    pub model: String,
    /// Request type as declared
    pub payload: String,
    /// Response type as declared
    pub result: String,
}

/// Routes of every enabled action, in registration order.
///
/// Endpoints must already be composed by
/// [`build_hierarchy`](crate::hierarchy::build_hierarchy).
#[must_use]
pub fn route_table(models: &[ModelInfo]) -> Vec<RouteEntry> {
    models
        .iter()
        .flat_map(|m| {
            m.design.actions().map(move |(route, action)| RouteEntry {
                method: action.phase.http_method(),
                path: format!("/{}{}", m.design.route_path(route), action.phase.route_suffix()),
                phase: action.phase,
                public: action.public,
                model: m.qualified_name(),
                payload: action.payload_or(&m.type_name).to_string(),
                result: action.result_or(&m.type_name).to_string(),
            })
        })
        .collect()
}
