//! Endpoint hierarchy.
//!
//! Model paths form a tree (`config/namespace/app` sits under
//! `config/namespace`). The final endpoint of a model is composed by walking
//! that tree from the root: each ancestor contributes its custom endpoint or
//! its plain path segment, followed by its route parameter when it declares
//! one. A model never contributes its own parameter.
//!
//! ```text
//! config/namespace      endpoint "namespaces", param "ns"  ->  config/namespaces
//! config/namespace/app  endpoint "apps"                    ->  config/namespaces/:ns/apps
//! ```
//!
//! Segments with no model or no custom endpoint keep their directory name.

use std::collections::{BTreeMap, HashMap};
use strata_core::{Error, Result};
use tracing::{debug, warn};

use crate::discovery::ModelInfo;

/// Prefix tree over slash-separated paths.
#[derive(Debug, Default)]
pub struct EndpointTrie {
    root: TrieNode,
    len: usize,
}

#[derive(Debug, Default)]
struct TrieNode {
    children: BTreeMap<String, TrieNode>,
    value: Option<usize>,
}

/// One node on the way from the root to a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ancestor {
    /// Accumulated path up to and including this node
    pub path: String,
    /// Last segment of [`Ancestor::path`]
    pub segment: String,
    /// Value stored at this node
    pub value: Option<usize>,
}

impl EndpointTrie {
    /// Creates an empty trie.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` at `path`, returning the value it replaced.
    pub fn insert(&mut self, path: &str, value: usize) -> Option<usize> {
        let mut node = &mut self.root;
        for segment in segments(path) {
            node = node.children.entry(segment.to_string()).or_default();
        }
        let previous = node.value.replace(value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Value stored at `path`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<usize> {
        let mut node = &self.root;
        for segment in segments(path) {
            node = node.children.get(segment)?;
        }
        node.value
    }

    /// Nodes from the root down to `path`, stopping at the first segment
    /// with no node.
    #[must_use]
    pub fn ancestors(&self, path: &str) -> Vec<Ancestor> {
        let mut out = Vec::new();
        let mut node = &self.root;
        let mut accumulated = String::new();
        for segment in segments(path) {
            let Some(child) = node.children.get(segment) else {
                break;
            };
            if !accumulated.is_empty() {
                accumulated.push('/');
            }
            accumulated.push_str(segment);
            out.push(Ancestor {
                path: accumulated.clone(),
                segment: segment.to_string(),
                value: child.value,
            });
            node = child;
        }
        out
    }

    /// Number of stored values.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Composes the final endpoint of every model in place.
///
/// Runs in two passes: the first claims a trie node per model path and
/// records custom endpoints, the second composes each endpoint from its
/// ancestors. A disabled model never takes a node from an enabled one.
///
/// # Errors
///
/// Returns [`Error::EndpointCollision`] if two enabled models share a model
/// path.
pub fn build_hierarchy(models: &mut [ModelInfo]) -> Result<EndpointTrie> {
    let mut trie = EndpointTrie::new();
    for (index, model) in models.iter().enumerate() {
        let Some(owner) = trie.get(&model.model_path) else {
            trie.insert(&model.model_path, index);
            continue;
        };
        let existing = &models[owner];
        match (existing.design.enabled, model.design.enabled) {
            (true, true) => {
                return Err(Error::EndpointCollision {
                    path: model.model_path.clone(),
                    first: existing.qualified_name(),
                    second: model.qualified_name(),
                });
            }
            (false, true) => {
                warn!(
                    "{} replaces disabled {} at '{}'",
                    model.qualified_name(),
                    existing.qualified_name(),
                    model.model_path
                );
                trie.insert(&model.model_path, index);
            }
            _ => warn!(
                "{} ignored, '{}' already belongs to {}",
                model.qualified_name(),
                model.model_path,
                existing.qualified_name()
            ),
        }
    }

    let custom: HashMap<&str, &str> = models
        .iter()
        .enumerate()
        .filter(|(index, m)| trie.get(&m.model_path) == Some(*index) && !m.design.endpoint.is_empty())
        .map(|(_, m)| (m.model_path.as_str(), m.design.endpoint.as_str()))
        .collect();

    let endpoints: Vec<String> = models
        .iter()
        .map(|m| compose(&trie, &custom, models, &m.model_path))
        .collect();

    for (model, endpoint) in models.iter_mut().zip(endpoints) {
        debug!("{} -> /{endpoint}", model.qualified_name());
        model.design.endpoint = endpoint;
    }
    Ok(trie)
}

fn compose(
    trie: &EndpointTrie,
    custom: &HashMap<&str, &str>,
    models: &[ModelInfo],
    model_path: &str,
) -> String {
    let ancestors = trie.ancestors(model_path);
    let last = ancestors.len().saturating_sub(1);
    let mut parts: Vec<String> = Vec::with_capacity(ancestors.len() * 2);
    for (depth, ancestor) in ancestors.iter().enumerate() {
        let segment = custom
            .get(ancestor.path.as_str())
            .copied()
            .unwrap_or(&ancestor.segment);
        parts.push(segment.to_string());
        if depth == last {
            break;
        }
        let param = ancestor
            .value
            .and_then(|i| models.get(i))
            .and_then(|m| m.design.param());
        if let Some(param) = param {
            parts.push(format!(":{param}"));
        }
    }
    parts.join("/")
}
