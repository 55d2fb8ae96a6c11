//! Naming and pluralization heuristics.
//!
//! These work on plain identifiers; no dictionary is consulted, so callers
//! keep an allow-list for the words the suffix rules get wrong.

use convert_case::{Case, Casing};

/// Words ending in `s` that are singular.
pub const SINGULAR_ALLOW_LIST: &[&str] = &[
    "alias", "atlas", "bias", "canvas", "chaos", "gas", "lens", "news", "series", "species",
];

/// Converts an identifier or path segment to snake_case.
///
/// # Examples
///
/// ```
/// use strata_core::naming::to_snake_case;
///
/// assert_eq!(to_snake_case("userName"), "user_name");
/// assert_eq!(to_snake_case("CreatedAt"), "created_at");
/// assert_eq!(to_snake_case("already_snake"), "already_snake");
/// ```
#[must_use]
pub fn to_snake_case(s: &str) -> String {
    s.to_case(Case::Snake)
}

/// Converts an identifier or path segment to PascalCase.
///
/// # Examples
///
/// ```
/// use strata_core::naming::to_pascal_case;
///
/// assert_eq!(to_pascal_case("login"), "Login");
/// assert_eq!(to_pascal_case("reset_password"), "ResetPassword");
/// assert_eq!(to_pascal_case(""), "");
/// ```
#[must_use]
pub fn to_pascal_case(s: &str) -> String {
    s.to_case(Case::Pascal)
}

/// Returns `true` if `s` is a lowercase snake_case identifier.
///
/// Digits are allowed anywhere but the first position.
///
/// # Examples
///
/// ```
/// use strata_core::naming::is_snake_case;
///
/// assert!(is_snake_case("created_at"));
/// assert!(is_snake_case("address2"));
/// assert!(!is_snake_case("createdAt"));
/// assert!(!is_snake_case("user-name"));
/// assert!(!is_snake_case("_private"));
/// ```
#[must_use]
pub fn is_snake_case(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_lowercase()
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !s.contains("__")
        && !s.ends_with('_')
}

/// Single-letter variable name derived from a type name.
///
/// # Examples
///
/// ```
/// use strata_core::naming::var_name;
///
/// assert_eq!(var_name("Namespace"), "n");
/// assert_eq!(var_name(""), "m");
/// ```
#[must_use]
pub fn var_name(type_name: &str) -> String {
    type_name
        .chars()
        .next()
        .map_or_else(|| "m".to_string(), |c| c.to_ascii_lowercase().to_string())
}

/// Strips the most common English plural suffixes from a word.
///
/// # Examples
///
/// ```
/// use strata_core::naming::singularize;
///
/// assert_eq!(singularize("policies"), "policy");
/// assert_eq!(singularize("boxes"), "box");
/// assert_eq!(singularize("users"), "user");
/// assert_eq!(singularize("status"), "status");
/// assert_eq!(singularize("class"), "class");
/// ```
#[must_use]
pub fn singularize(word: &str) -> String {
    if word.len() > 3 && word.ends_with("ies") {
        return format!("{}y", &word[..word.len() - 3]);
    }
    for suffix in ["sses", "shes", "ches", "xes", "zes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.len() > 1
        && word.ends_with('s')
        && !word.ends_with("ss")
        && !word.ends_with("us")
        && !word.ends_with("is")
    {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// Returns `true` if the last snake_case word of `name` looks plural.
///
/// Words in `allow` (and [`SINGULAR_ALLOW_LIST`]) are never plural.
///
/// # Examples
///
/// ```
/// use strata_core::naming::is_plural;
///
/// assert!(is_plural("users", &[]));
/// assert!(is_plural("user_groups", &[]));
/// assert!(!is_plural("user_group", &[]));
/// assert!(!is_plural("news", &[]));
/// assert!(!is_plural("settings", &["settings".to_string()]));
/// ```
#[must_use]
pub fn is_plural(name: &str, allow: &[String]) -> bool {
    let lower = name.to_lowercase();
    if SINGULAR_ALLOW_LIST.contains(&lower.as_str()) || allow.iter().any(|a| *a == lower) {
        return false;
    }
    let last = lower.rsplit('_').next().unwrap_or(&lower);
    if SINGULAR_ALLOW_LIST.contains(&last) || allow.iter().any(|a| a == last) {
        return false;
    }
    singularize(last) != last
}

/// Singular form of a snake_case name, used in lint suggestions.
#[must_use]
pub fn singular_name(name: &str) -> String {
    match name.rsplit_once('_') {
        Some((head, last)) => format!("{head}_{}", singularize(last)),
        None => singularize(name),
    }
}
