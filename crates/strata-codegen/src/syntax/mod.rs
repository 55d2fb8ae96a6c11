//! Syntax helpers shared by discovery, patching and linting.

mod span;
mod uses;

pub use span::{Edit, EditSet, SourceMap};
pub use uses::{UseEntry, UseMap, absolute_path, path_segments, use_line};

use proc_macro2::{Delimiter, TokenStream, TokenTree};
use quote::{ToTokens, quote};
use std::path::Path;
use strata_core::{Error, Result};
use syn::visit_mut::{self, VisitMut};

/// Type names that never take a package qualifier.
const PRELUDE_TYPES: &[&str] = &["Box", "Option", "Result", "Self", "String", "Vec"];

/// Parses Rust source, keeping spans aligned with `src`.
///
/// # Errors
///
/// Returns [`Error::Parse`] naming `path` on a syntax error.
pub fn parse_source(path: &Path, src: &str) -> Result<syn::File> {
    syn::parse_str::<syn::File>(src).map_err(|e| {
        let at = e.span().start();
        Error::Parse {
            path: path.to_path_buf(),
            message: format!("{}:{}: {e}", at.line, at.column + 1),
        }
    })
}

/// Parses a type expression and prefixes bare type names with `qualifier`.
///
/// Names in `bare`, primitives and prelude types stay unqualified;
/// already-qualified paths are kept as written.
///
/// # Examples
///
/// ```
/// use strata_codegen::syntax::{qualify_type, render_type};
///
/// let ty = qualify_type("Box<UserReq>", "user", &[]).unwrap();
/// assert_eq!(render_type(&ty), "Box<user::UserReq>");
///
/// let ty = qualify_type("Vec<crate::types::Page>", "user", &[]).unwrap();
/// assert_eq!(render_type(&ty), "Vec<crate::types::Page>");
/// ```
///
/// # Errors
///
/// Returns [`Error::Codegen`] if `spec` is not a type or `qualifier` is not
/// a path.
pub fn qualify_type(spec: &str, qualifier: &str, bare: &[&str]) -> Result<syn::Type> {
    let invalid = |e: syn::Error| Error::Codegen {
        target: spec.to_string(),
        message: e.to_string(),
    };
    let mut ty: syn::Type = syn::parse_str(spec).map_err(invalid)?;
    let prefix: syn::Path = syn::parse_str(qualifier).map_err(invalid)?;
    Qualify {
        prefix: &prefix,
        bare,
    }
    .visit_type_mut(&mut ty);
    Ok(ty)
}

struct Qualify<'a> {
    prefix: &'a syn::Path,
    bare: &'a [&'a str],
}

impl VisitMut for Qualify<'_> {
    fn visit_type_path_mut(&mut self, node: &mut syn::TypePath) {
        if node.qself.is_none()
            && node.path.leading_colon.is_none()
            && node.path.segments.len() == 1
        {
            let segment = &node.path.segments[0];
            let name = segment.ident.to_string();
            let needs_prefix = name.starts_with(|c: char| c.is_ascii_uppercase())
                && !PRELUDE_TYPES.contains(&name.as_str())
                && !self.bare.contains(&name.as_str());
            if needs_prefix {
                let mut path = self.prefix.clone();
                path.segments.push(segment.clone());
                node.path = path;
            }
        }
        visit_mut::visit_type_path_mut(self, node);
    }
}

/// Renders a type the way `prettyplease` prints it.
#[must_use]
pub fn render_type(ty: &syn::Type) -> String {
    let item: syn::File = syn::parse_quote!(type Rendered = #ty;);
    let printed = prettyplease::unparse(&item);
    printed
        .trim()
        .strip_prefix("type Rendered = ")
        .and_then(|s| s.strip_suffix(';'))
        .map_or_else(|| ty.to_token_stream().to_string(), str::to_string)
}

/// Canonical text of a type with every import alias expanded.
///
/// Two types written differently but naming the same thing (`ns::Namespace`
/// and `crate::model::ns::Namespace`) normalize to the same string.
#[must_use]
pub fn normalize_type(ty: &syn::Type, uses: &UseMap) -> String {
    let mut out = String::new();
    normalize_tokens(quote!(#ty), uses, &mut out);
    out
}

fn normalize_tokens(tokens: TokenStream, uses: &UseMap, out: &mut String) {
    let mut after_colons = false;
    let mut after_ident = false;
    for token in tokens {
        match token {
            TokenTree::Ident(ident) => {
                let name = ident.to_string();
                if after_ident {
                    out.push(' ');
                }
                match uses.get(&name).filter(|_| !after_colons) {
                    Some(entry) => out.push_str(&entry.path_string()),
                    None => out.push_str(&name),
                }
                after_colons = false;
                after_ident = true;
            }
            TokenTree::Punct(punct) => {
                out.push(punct.as_char());
                after_colons = punct.as_char() == ':';
                after_ident = false;
            }
            TokenTree::Group(group) => {
                let (open, close) = match group.delimiter() {
                    Delimiter::Parenthesis => ("(", ")"),
                    Delimiter::Bracket => ("[", "]"),
                    Delimiter::Brace => ("{", "}"),
                    Delimiter::None => ("", ""),
                };
                out.push_str(open);
                normalize_tokens(group.stream(), uses, out);
                out.push_str(close);
                after_colons = false;
                after_ident = false;
            }
            TokenTree::Literal(lit) => {
                out.push_str(&lit.to_string());
                after_colons = false;
                after_ident = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uses(src: &str) -> UseMap {
        UseMap::from_file(&syn::parse_str(src).unwrap())
    }

    #[test]
    fn test_qualify_nested_generics() {
        let ty = qualify_type("Vec<Namespace>", "ns", &[]).unwrap();
        assert_eq!(render_type(&ty), "Vec<ns::Namespace>");

        let ty = qualify_type("Option<u64>", "ns", &[]).unwrap();
        assert_eq!(render_type(&ty), "Option<u64>");
    }

    #[test]
    fn test_qualify_keeps_bare_names() {
        let ty = qualify_type("User", "crate::model::user", &["User"]).unwrap();
        assert_eq!(render_type(&ty), "User");
    }

    #[test]
    fn test_qualify_rejects_garbage() {
        assert!(qualify_type("Vec<", "ns", &[]).is_err());
    }

    #[test]
    fn test_normalize_equates_aliases() {
        let map = uses("use crate::model::config::namespace as ns;");
        let aliased: syn::Type = syn::parse_str("Box<ns::Namespace>").unwrap();
        let full: syn::Type =
            syn::parse_str("Box<crate::model::config::namespace::Namespace>").unwrap();
        assert_eq!(normalize_type(&aliased, &map), normalize_type(&full, &map));

        let other: syn::Type = syn::parse_str("Box<ns::Other>").unwrap();
        assert_ne!(normalize_type(&aliased, &map), normalize_type(&other, &map));
    }

    #[test]
    fn test_parse_source_reports_location() {
        let err = parse_source(Path::new("broken.rs"), "fn main( {").unwrap_err();
        assert!(err.is_parse_error());
        assert!(err.to_string().contains("broken.rs"));
    }
}
