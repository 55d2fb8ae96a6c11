//! Flattened view of a file's `use` items.

use syn::{Item, ItemUse, UseTree};

/// One name a `use` item brings into scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UseEntry {
    /// Name in scope (`_` for `as _`)
    pub local: String,
    /// Full imported path
    pub path: Vec<String>,
    /// Index of the `use` item in the file's top-level items
    pub item: usize,
}

impl UseEntry {
    /// Whether the entry binds a name other than its last path segment.
    #[must_use]
    pub fn is_renamed(&self) -> bool {
        self.path.last().is_none_or(|last| *last != self.local)
    }

    /// Path joined with `::`.
    #[must_use]
    pub fn path_string(&self) -> String {
        self.path.join("::")
    }
}

/// Top-level imports of one file, in source order.
#[derive(Debug, Clone, Default)]
pub struct UseMap {
    entries: Vec<UseEntry>,
    globs: Vec<(Vec<String>, usize)>,
}

impl UseMap {
    /// Collects the top-level `use` items of `file`.
    #[must_use]
    pub fn from_file(file: &syn::File) -> Self {
        Self::from_items(&file.items)
    }

    /// Collects the `use` items among `items`.
    #[must_use]
    pub fn from_items(items: &[Item]) -> Self {
        let mut map = Self::default();
        for (index, item) in items.iter().enumerate() {
            if let Item::Use(item_use) = item {
                map.add_item(index, item_use);
            }
        }
        map
    }

    fn add_item(&mut self, index: usize, item: &ItemUse) {
        let mut prefix = Vec::new();
        if item.leading_colon.is_some() {
            prefix.push(String::new());
        }
        flatten(&item.tree, &mut prefix, index, &mut self.entries, &mut self.globs);
    }

    /// Every named entry.
    #[must_use]
    pub fn entries(&self) -> &[UseEntry] {
        &self.entries
    }

    /// Entries belonging to the `use` item at `item`.
    pub fn entries_of(&self, item: usize) -> impl Iterator<Item = &UseEntry> {
        self.entries.iter().filter(move |e| e.item == item)
    }

    /// Glob prefixes belonging to the `use` item at `item`.
    pub fn globs_of(&self, item: usize) -> impl Iterator<Item = &[String]> {
        self.globs
            .iter()
            .filter(move |(_, i)| *i == item)
            .map(|(p, _)| p.as_slice())
    }

    /// Entry binding `local`; later items shadow earlier ones.
    #[must_use]
    pub fn get(&self, local: &str) -> Option<&UseEntry> {
        self.entries.iter().rev().find(|e| e.local == local)
    }

    /// Binds `local` to `path`, shadowing any existing entry.
    pub fn bind(&mut self, local: &str, path: Vec<String>) {
        self.entries.push(UseEntry {
            local: local.to_string(),
            path,
            item: usize::MAX,
        });
    }

    /// Expands the first segment of `segments` through the imports.
    #[must_use]
    pub fn resolve(&self, segments: &[String]) -> Vec<String> {
        let Some((first, rest)) = segments.split_first() else {
            return Vec::new();
        };
        match self.get(first) {
            Some(entry) => entry.path.iter().chain(rest).cloned().collect(),
            None => segments.to_vec(),
        }
    }

    /// Resolves a parsed path through the imports.
    #[must_use]
    pub fn resolve_path(&self, path: &syn::Path) -> Vec<String> {
        let segments = path_segments(path);
        if path.leading_colon.is_some() {
            return segments;
        }
        self.resolve(&segments)
    }

    /// Every imported path including globs (ending in `*`).
    #[must_use]
    pub fn import_paths(&self) -> Vec<Vec<String>> {
        let mut paths: Vec<Vec<String>> = self.entries.iter().map(|e| e.path.clone()).collect();
        paths.extend(self.globs.iter().map(|(prefix, _)| {
            let mut path = prefix.clone();
            path.push("*".to_string());
            path
        }));
        paths
    }
}

fn flatten(
    tree: &UseTree,
    prefix: &mut Vec<String>,
    item: usize,
    entries: &mut Vec<UseEntry>,
    globs: &mut Vec<(Vec<String>, usize)>,
) {
    match tree {
        UseTree::Path(p) => {
            prefix.push(p.ident.to_string());
            flatten(&p.tree, prefix, item, entries, globs);
            prefix.pop();
        }
        UseTree::Name(n) => {
            let name = n.ident.to_string();
            let (local, path) = if name == "self" {
                (prefix.last().cloned().unwrap_or_default(), prefix.clone())
            } else {
                let mut path = prefix.clone();
                path.push(name.clone());
                (name, path)
            };
            entries.push(UseEntry { local, path, item });
        }
        UseTree::Rename(r) => {
            let name = r.ident.to_string();
            let mut path = prefix.clone();
            if name != "self" {
                path.push(name);
            }
            entries.push(UseEntry {
                local: r.rename.to_string(),
                path,
                item,
            });
        }
        UseTree::Glob(_) => globs.push((prefix.clone(), item)),
        UseTree::Group(g) => {
            for tree in &g.items {
                flatten(tree, prefix, item, entries, globs);
            }
        }
    }
}

/// Absolute form of a path written inside module `module`.
///
/// A leading `crate` is replaced by `crate_root`, `self` by `module` and
/// each `super` drops one trailing segment of `module`. Other paths are
/// returned as written.
///
/// ```
/// use strata_codegen::syntax::absolute_path;
///
/// let path = |s: &str| s.split("::").map(String::from).collect::<Vec<_>>();
/// let module = path("crate::service::user::create");
/// let root = path("crate");
///
/// assert_eq!(absolute_path(&path("super::get"), &module, &root), path("crate::service::user::get"));
/// assert_eq!(absolute_path(&path("super::super::group"), &module, &root), path("crate::service::group"));
/// assert_eq!(absolute_path(&path("self::helpers"), &module, &root), path("crate::service::user::create::helpers"));
/// assert_eq!(absolute_path(&path("strata::service"), &module, &root), path("strata::service"));
/// ```
#[must_use]
pub fn absolute_path(written: &[String], module: &[String], crate_root: &[String]) -> Vec<String> {
    match written.first().map(String::as_str) {
        Some("crate") => crate_root.iter().chain(&written[1..]).cloned().collect(),
        Some("self") => module.iter().chain(&written[1..]).cloned().collect(),
        Some("super") => {
            let ups = written.iter().take_while(|s| *s == "super").count();
            let keep = module.len().saturating_sub(ups);
            module[..keep].iter().chain(&written[ups..]).cloned().collect()
        }
        _ => written.to_vec(),
    }
}

/// Segment idents of a path, without generic arguments.
#[must_use]
pub fn path_segments(path: &syn::Path) -> Vec<String> {
    path.segments.iter().map(|s| s.ident.to_string()).collect()
}

/// Renders one flattened entry as a `use` line.
#[must_use]
pub fn use_line(path: &[String], local: &str) -> String {
    let joined = path.join("::");
    if path.last().is_some_and(|last| last == local) {
        format!("use {joined};")
    } else {
        format!("use {joined} as {local};")
    }
}
