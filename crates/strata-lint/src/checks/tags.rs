//! Serialization tag conventions.
//!
//! Wire names are snake_case: `#[serde(rename = "..")]` and
//! `#[serde(alias = "..")]` values must be snake_case identifiers, and
//! `rename_all` may only be `"snake_case"`.

use strata_core::naming::{is_snake_case, to_snake_case};
use syn::meta::ParseNestedMeta;
use syn::{Attribute, Fields, Item, LitStr, Token};
use tracing::debug;

use super::SourceFile;
use crate::report::{Check, Violation};

const RENAME_ALL: &str = "snake_case";

/// `serde` values of one attribute list. Container-level `rename` is a
/// type name and is not checked.
#[derive(Debug, Default)]
struct SerdeNames {
    rename: Vec<String>,
    alias: Vec<String>,
    rename_all: Vec<String>,
}

/// Checks every struct and enum in `file`, including inline modules.
#[must_use]
pub fn check(file: &SourceFile) -> Vec<Violation> {
    let mut out = Vec::new();
    check_items(file, &file.syntax.items, &mut out);
    out
}

fn check_items(file: &SourceFile, items: &[Item], out: &mut Vec<Violation>) {
    for item in items {
        match item {
            Item::Struct(s) => {
                let name = s.ident.to_string();
                container(file, "struct", &name, &s.attrs, out);
                fields(file, &name, &s.fields, out);
            }
            Item::Enum(e) => {
                let name = e.ident.to_string();
                container(file, "enum", &name, &e.attrs, out);
                for variant in &e.variants {
                    let owner = format!("{name}::{}", variant.ident);
                    member(file, "variant", &owner, &variant.attrs, out);
                    fields(file, &owner, &variant.fields, out);
                }
            }
            Item::Mod(m) => {
                if let Some((_, items)) = &m.content {
                    check_items(file, items, out);
                }
            }
            _ => {}
        }
    }
}

fn container(file: &SourceFile, kind: &str, name: &str, attrs: &[Attribute], out: &mut Vec<Violation>) {
    let names = serde_names(file, attrs);
    for value in names.rename_all.iter().filter(|v| *v != RENAME_ALL) {
        out.push(Violation::new(
            Check::Tags,
            format!(
                "{}: {kind} `{name}` uses rename_all = \"{value}\", only \"{RENAME_ALL}\" is allowed",
                file.display
            ),
        ));
    }
}

fn fields(file: &SourceFile, owner: &str, fields: &Fields, out: &mut Vec<Violation>) {
    for (index, field) in fields.iter().enumerate() {
        let name = field
            .ident
            .as_ref()
            .map_or_else(|| index.to_string(), ToString::to_string);
        member(file, "field", &format!("{owner}.{name}"), &field.attrs, out);
    }
}

fn member(file: &SourceFile, kind: &str, name: &str, attrs: &[Attribute], out: &mut Vec<Violation>) {
    let names = serde_names(file, attrs);
    let tagged = names
        .rename
        .iter()
        .map(|v| ("rename", v))
        .chain(names.alias.iter().map(|v| ("alias", v)));
    for (key, value) in tagged {
        if !is_snake_case(value) {
            out.push(Violation::new(
                Check::Tags,
                format!(
                    "{}: {kind} `{name}` serde {key} \"{value}\" is not snake_case, use \"{}\"",
                    file.display,
                    to_snake_case(value)
                ),
            ));
        }
    }
}

fn serde_names(file: &SourceFile, attrs: &[Attribute]) -> SerdeNames {
    let mut names = SerdeNames::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        let parsed = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                string_values(&meta, &mut names.rename)
            } else if meta.path.is_ident("alias") {
                string_values(&meta, &mut names.alias)
            } else if meta.path.is_ident("rename_all") {
                string_values(&meta, &mut names.rename_all)
            } else {
                skip(&meta)
            }
        });
        if let Err(e) = parsed {
            debug!("{}: unreadable serde attribute: {e}", file.display);
        }
    }
    names
}

/// Reads `key = "v"` or `key(serialize = "a", deserialize = "b")`.
fn string_values(meta: &ParseNestedMeta<'_>, out: &mut Vec<String>) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        let lit: LitStr = meta.value()?.parse()?;
        out.push(lit.value());
        return Ok(());
    }
    meta.parse_nested_meta(|inner| {
        let lit: LitStr = inner.value()?.parse()?;
        out.push(lit.value());
        Ok(())
    })
}

fn skip(meta: &ParseNestedMeta<'_>) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        let _content;
        syn::parenthesized!(_content in meta.input);
    }
    Ok(())
}
