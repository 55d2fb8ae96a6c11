//! Rewriting references to a moved model package.

use proc_macro2::{Spacing, TokenStream, TokenTree};
use syn::visit::{self, Visit};

use crate::syntax::{EditSet, SourceMap, UseMap, use_line};

/// Queues a replacement of every path starting with `prefix`.
///
/// Covers type and expression paths, macro paths and `prefix::…` token
/// runs inside macro bodies. `use` items are skipped; they are rewritten
/// separately by [`rewrite_use_item`].
pub fn rename_prefix(
    file: &syn::File,
    map: &SourceMap<'_>,
    prefix: &[String],
    replacement: &str,
    edits: &mut EditSet,
) {
    if prefix.is_empty() {
        return;
    }
    let mut visitor = PrefixRename {
        prefix,
        replacement,
        map,
        edits,
    };
    visitor.visit_file(file);
}

struct PrefixRename<'a, 's> {
    prefix: &'a [String],
    replacement: &'a str,
    map: &'a SourceMap<'s>,
    edits: &'a mut EditSet,
}

impl PrefixRename<'_, '_> {
    fn scan_tokens(&mut self, tokens: TokenStream) {
        let trees: Vec<TokenTree> = tokens.into_iter().collect();
        let mut i = 0;
        while i < trees.len() {
            if let TokenTree::Group(group) = &trees[i] {
                self.scan_tokens(group.stream());
            } else if let Some(end) = self.match_at(&trees, i) {
                let start = self.map.offset(trees[i].span().start());
                let stop = self.map.offset(trees[end - 1].span().end());
                self.edits.replace(start..stop, self.replacement);
                i = end;
                continue;
            }
            i += 1;
        }
    }

    /// Index just past the prefix when `trees[start..]` begins with
    /// `prefix ::` and is not itself the tail of a longer path.
    fn match_at(&self, trees: &[TokenTree], start: usize) -> Option<usize> {
        if start > 0 && is_colon(&trees[start - 1]) {
            return None;
        }
        let mut i = start;
        for (n, segment) in self.prefix.iter().enumerate() {
            if n > 0 {
                if !(is_joint_colon(trees.get(i)?) && is_colon(trees.get(i + 1)?)) {
                    return None;
                }
                i += 2;
            }
            match trees.get(i)? {
                TokenTree::Ident(ident) if ident == segment => {}
                _ => return None,
            }
            i += 1;
        }
        (is_joint_colon(trees.get(i)?) && is_colon(trees.get(i + 1)?)).then_some(i)
    }
}

fn is_colon(tree: &TokenTree) -> bool {
    matches!(tree, TokenTree::Punct(p) if p.as_char() == ':')
}

fn is_joint_colon(tree: &TokenTree) -> bool {
    matches!(tree, TokenTree::Punct(p) if p.as_char() == ':' && p.spacing() == Spacing::Joint)
}

impl<'ast> Visit<'ast> for PrefixRename<'_, '_> {
    fn visit_item_use(&mut self, _node: &'ast syn::ItemUse) {}

    fn visit_path(&mut self, path: &'ast syn::Path) {
        let n = self.prefix.len();
        let matches = path.leading_colon.is_none()
            && path.segments.len() > n
            && path
                .segments
                .iter()
                .zip(self.prefix)
                .all(|(segment, expected)| segment.ident == expected);
        if matches {
            let start = self.map.offset(path.segments[0].ident.span().start());
            let end = self.map.offset(path.segments[n - 1].ident.span().end());
            self.edits.replace(start..end, self.replacement);
        }
        visit::visit_path(self, path);
    }

    fn visit_macro(&mut self, node: &'ast syn::Macro) {
        self.scan_tokens(node.tokens.clone());
        visit::visit_macro(self, node);
    }
}

/// One stale import to repoint.
#[derive(Debug, Clone)]
pub struct UseRewrite<'a> {
    /// Index of the `use` item among the file's items
    pub item: usize,
    /// Name the stale entry binds
    pub local: &'a str,
    /// Path the entry should import
    pub new_path: &'a [String],
    /// Name the entry should bind
    pub new_local: &'a str,
}

/// Re-renders the `use` item named by `rewrite` with its stale entry
/// repointed.
///
/// Other names imported by the same item keep their paths; a grouped
/// item is split into one line per name.
pub fn rewrite_use_item(
    file: &syn::File,
    uses: &UseMap,
    map: &SourceMap<'_>,
    rewrite: &UseRewrite<'_>,
    edits: &mut EditSet,
) {
    let Some(syn::Item::Use(item_use)) = file.items.get(rewrite.item) else {
        return;
    };

    let mut lines: Vec<String> = uses
        .entries_of(rewrite.item)
        .map(|entry| {
            if entry.local == rewrite.local {
                use_line(rewrite.new_path, rewrite.new_local)
            } else {
                use_line(&entry.path, &entry.local)
            }
        })
        .collect();
    lines.extend(
        uses.globs_of(rewrite.item)
            .map(|prefix| format!("use {}::*;", prefix.join("::"))),
    );

    let visibility = match &item_use.vis {
        syn::Visibility::Inherited => String::new(),
        vis => map.text_of(vis).map(|v| format!("{v} ")).unwrap_or_default(),
    };
    let replacement = lines.join(&format!("\n{visibility}"));

    let start = map.offset(item_use.use_token.span.start());
    let end = map.offset(item_use.semi_token.spans[0].end());
    edits.replace(start..end, replacement);
}
