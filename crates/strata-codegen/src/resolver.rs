//! Collision-free local names for imported module paths.
//!
//! Generated files import many modules whose last segment may coincide
//! (`crate::model::user` and `crate::model::admin::user`). Each colliding
//! path gets an alias built from its trailing segments, widened until the
//! aliases differ.

use std::collections::{BTreeMap, BTreeSet};
use strata_core::{Error, Result};

/// Import path to the alias it is bound under. Paths absent from the map
/// are imported under their last segment.
pub type AliasMap = BTreeMap<String, String>;

/// Assigns aliases to the paths whose last segments collide.
///
/// The input is deduplicated first, so repeating a path never causes a
/// collision. Output is independent of input order.
///
/// # Examples
///
/// ```
/// use strata_codegen::resolver::resolve_aliases;
///
/// let aliases = resolve_aliases(["crate::a::user", "crate::b::user", "crate::c::team"]);
/// assert_eq!(aliases.get("crate::a::user").map(String::as_str), Some("a_user"));
/// assert_eq!(aliases.get("crate::b::user").map(String::as_str), Some("b_user"));
/// assert!(!aliases.contains_key("crate::c::team"));
/// ```
pub fn resolve_aliases<I, S>(paths: I) -> AliasMap
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let unique: BTreeSet<String> = paths.into_iter().map(|p| p.as_ref().to_string()).collect();

    let mut by_last: BTreeMap<String, Vec<Vec<&str>>> = BTreeMap::new();
    for path in &unique {
        let segments: Vec<&str> = path.split("::").collect();
        let last = segments.last().copied().unwrap_or_default().to_string();
        by_last.entry(last).or_default().push(segments);
    }

    let mut aliases = AliasMap::new();
    for group in by_last.values().filter(|g| g.len() > 1) {
        let longest = group.iter().map(Vec::len).max().unwrap_or(1);
        let mut width = 2;
        loop {
            let candidates: Vec<String> = group.iter().map(|s| tail_alias(s, width)).collect();
            let distinct: BTreeSet<&String> = candidates.iter().collect();
            if distinct.len() == candidates.len() || width >= longest {
                for (segments, alias) in group.iter().zip(candidates) {
                    aliases.insert(segments.join("::"), alias);
                }
                break;
            }
            width += 1;
        }
    }
    aliases
}

fn tail_alias(segments: &[&str], width: usize) -> String {
    let start = segments.len().saturating_sub(width);
    segments[start..].join("_")
}

/// Resolved `use` set of one generated file.
#[derive(Debug, Clone, Default)]
pub struct Imports {
    paths: BTreeSet<String>,
    aliases: AliasMap,
}

impl Imports {
    /// Resolves `paths` into a set of collision-free imports.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paths: BTreeSet<String> = paths.into_iter().map(|p| p.as_ref().to_string()).collect();
        let aliases = resolve_aliases(&paths);
        Self { paths, aliases }
    }

    /// Returns `true` if nothing is imported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Name `path` is bound under in the generated file.
    #[must_use]
    pub fn local_name(&self, path: &str) -> String {
        self.aliases.get(path).cloned().unwrap_or_else(|| {
            path.rsplit("::").next().unwrap_or(path).to_string()
        })
    }

    /// `use` lines in path order.
    #[must_use]
    pub fn use_lines(&self) -> Vec<String> {
        self.paths
            .iter()
            .map(|path| {
                let segments: Vec<String> = path.split("::").map(str::to_string).collect();
                crate::syntax::use_line(&segments, &self.local_name(path))
            })
            .collect()
    }

    /// `use` items ready to splice into a generated file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Codegen`] if a path is not a valid Rust path.
    pub fn use_items(&self) -> Result<Vec<syn::ItemUse>> {
        self.use_lines()
            .iter()
            .map(|line| {
                syn::parse_str::<syn::ItemUse>(line).map_err(|e| Error::Codegen {
                    target: line.clone(),
                    message: e.to_string(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_collisions_no_aliases() {
        let aliases = resolve_aliases(["strata::service", "crate::model::user"]);
        assert!(aliases.is_empty());
    }

    #[test]
    fn test_only_colliding_final_segments_get_aliases() {
        let aliases = resolve_aliases([
            "crate::model::pkg1::user",
            "crate::model::pkg2::user",
            "crate::model::pkg3::group",
        ]);
        assert_eq!(aliases["crate::model::pkg1::user"], "pkg1_user");
        assert_eq!(aliases["crate::model::pkg2::user"], "pkg2_user");
        assert!(!aliases.contains_key("crate::model::pkg3::group"));
    }

    #[test]
    fn test_duplicates_do_not_collide() {
        let aliases = resolve_aliases(["crate::model::user", "crate::model::user"]);
        assert!(aliases.is_empty());
    }

    #[test]
    fn test_widens_until_distinct() {
        let aliases = resolve_aliases(["crate::x::admin::user", "crate::y::admin::user"]);
        assert_eq!(aliases["crate::x::admin::user"], "x_admin_user");
        assert_eq!(aliases["crate::y::admin::user"], "y_admin_user");
    }

    #[test]
    fn test_order_independent() {
        let a = resolve_aliases(["crate::b::user", "crate::a::user"]);
        let b = resolve_aliases(["crate::a::user", "crate::b::user"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_imports_render() {
        let imports = Imports::from_paths(["strata::model", "crate::model::user", "crate::model::admin::user"]);
        assert_eq!(imports.local_name("strata::model"), "model");
        assert_eq!(imports.local_name("crate::model::user"), "model_user");
        assert_eq!(imports.local_name("crate::model::admin::user"), "admin_user");
        assert_eq!(
            imports.use_lines(),
            vec![
                "use crate::model::admin::user as admin_user;",
                "use crate::model::user as model_user;",
                "use strata::model;",
            ]
        );
        assert_eq!(imports.use_items().unwrap().len(), 3);
    }
}
