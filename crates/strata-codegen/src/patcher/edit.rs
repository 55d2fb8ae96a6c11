//! Minimal updates to existing service files.

use strata_core::Result;
use syn::{GenericArgument, PathArguments, Type};
use tracing::{trace, warn};

use super::ServiceSpec;
use super::rename::{UseRewrite, rename_prefix, rewrite_use_item};
use super::shapes::{self, MethodShape};
use crate::resolver::resolve_aliases;
use crate::syntax::{
    EditSet, SourceMap, UseEntry, UseMap, absolute_path, normalize_type, parse_source,
    path_segments, qualify_type, render_type,
};

/// The three type arguments of the framework service base.
struct BaseDecl<'f> {
    struct_name: &'f syn::Ident,
    model: &'f Type,
    payload: &'f Type,
    result: &'f Type,
}

/// How the model package is referenced in the patched file.
struct Binding {
    /// Prefix desired types are qualified with
    qualifier: String,
    /// Names that are already in scope unqualified
    bare: Vec<String>,
    /// Module path the file still pointed at, when it moved
    stale: Option<String>,
}

/// Computes the patched text of an existing service file.
///
/// Returns `None` when nothing needs to change, or when the file no longer
/// parses or no longer holds a service declaration; both are reported and
/// left for the user.
pub(super) fn patch_source(src: &str, spec: &ServiceSpec<'_>) -> Result<Option<String>> {
    let file = match parse_source(&spec.path, src) {
        Ok(file) => file,
        Err(e) => {
            warn!("leaving service file unchanged: {e}");
            return Ok(None);
        }
    };
    let uses = UseMap::from_file(&file);
    let map = SourceMap::new(src);
    let Some(base) = find_base(&file, &uses, &spec.framework, &spec.struct_name) else {
        warn!(
            "{} declares no {}::service::Base field, leaving it unchanged",
            spec.path.display(),
            spec.framework
        );
        return Ok(None);
    };

    let package: Vec<String> = spec
        .model
        .package_path
        .split("::")
        .map(str::to_string)
        .collect();
    let mut edits = EditSet::new();
    let mut norm = uses.clone();
    let binding = rebind_model(&file, &uses, &map, &base, spec, &package, &mut edits, &mut norm);

    let current = spec.model.package_path.as_str();
    let canon = |ty: &Type| -> String {
        let text = normalize_type(ty, &norm);
        match &binding.stale {
            Some(old) => text.replace(&format!("{old}::"), &format!("{current}::")),
            None => text,
        }
    };

    let bare: Vec<&str> = binding.bare.iter().map(String::as_str).collect();
    let payload = qualify_type(spec.payload(), &binding.qualifier, &bare)?;
    let result = qualify_type(spec.result(), &binding.qualifier, &bare)?;

    retarget(&mut edits, &map, base.payload, &payload, &canon);
    retarget(&mut edits, &map, base.result, &result, &canon);

    for sig in methods_of(&file, base.struct_name, spec.method()) {
        if let Some(req) = shapes::request_type(sig) {
            retarget(&mut edits, &map, req, &payload, &canon);
        }
        if let Some(rsp) = shapes::response_type(sig) {
            retarget(&mut edits, &map, rsp, &result, &canon);
        }
    }

    if edits.is_empty() {
        return Ok(None);
    }
    trace!("{} edit(s) for {}", edits.len(), spec.path.display());
    let patched = edits.apply(src);
    Ok((patched != src).then_some(patched))
}

fn retarget(
    edits: &mut EditSet,
    map: &SourceMap<'_>,
    existing: &Type,
    desired: &Type,
    canon: &dyn Fn(&Type) -> String,
) {
    if canon(existing) == canon(desired) {
        return;
    }
    if let Some(range) = map.range_of(existing) {
        edits.replace(range, render_type(desired));
    }
}

fn find_base<'f>(
    file: &'f syn::File,
    uses: &UseMap,
    framework: &str,
    struct_name: &str,
) -> Option<BaseDecl<'f>> {
    let mut first = None;
    for item in &file.items {
        let syn::Item::Struct(item) = item else {
            continue;
        };
        for field in &item.fields {
            let Some((model, payload, result)) = base_args(&field.ty, uses, framework) else {
                continue;
            };
            let decl = BaseDecl {
                struct_name: &item.ident,
                model,
                payload,
                result,
            };
            if item.ident == struct_name {
                return Some(decl);
            }
            first.get_or_insert(decl);
        }
    }
    first
}

fn base_args<'f>(ty: &'f Type, uses: &UseMap, framework: &str) -> Option<(&'f Type, &'f Type, &'f Type)> {
    let Type::Path(path) = ty else {
        return None;
    };
    let resolved = uses.resolve_path(&path.path);
    let is_base = matches!(
        resolved.as_slice(),
        [fw, module, name] if fw == framework && module == "service" && name == "Base"
    );
    if !is_base {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &path.path.segments.last()?.arguments else {
        return None;
    };
    let types: Vec<&Type> = args
        .args
        .iter()
        .filter_map(|arg| match arg {
            GenericArgument::Type(t) => Some(t),
            _ => None,
        })
        .collect();
    match types.as_slice() {
        [model, payload, result] => Some((model, payload, result)),
        _ => None,
    }
}

/// Signatures of the action-shaped `method` in inherent impls of `struct_name`.
fn methods_of<'f>(
    file: &'f syn::File,
    struct_name: &syn::Ident,
    method: &str,
) -> Vec<&'f syn::Signature> {
    let mut found = Vec::new();
    for item in &file.items {
        let syn::Item::Impl(item) = item else {
            continue;
        };
        let Type::Path(self_ty) = &*item.self_ty else {
            continue;
        };
        if item.trait_.is_some()
            || self_ty.path.segments.last().is_none_or(|s| s.ident != *struct_name)
        {
            continue;
        }
        for impl_item in &item.items {
            let syn::ImplItem::Fn(f) = impl_item else {
                continue;
            };
            match shapes::classify(&f.sig, method) {
                Some(MethodShape::Action) => found.push(&f.sig),
                Some(MethodShape::Hook(shape)) => {
                    trace!("hook {} ({shape:?}) left untouched", f.sig.ident);
                }
                None => {}
            }
        }
    }
    found
}

/// Repoints the import of the model package when the model moved, and
/// records how desired types should be qualified.
#[allow(clippy::too_many_arguments)]
fn rebind_model(
    file: &syn::File,
    uses: &UseMap,
    map: &SourceMap<'_>,
    base: &BaseDecl<'_>,
    spec: &ServiceSpec<'_>,
    package: &[String],
    edits: &mut EditSet,
    norm: &mut UseMap,
) -> Binding {
    let package_path = package.join("::");
    let fallback = Binding {
        qualifier: package_path.clone(),
        bare: vec![spec.model.type_name.clone()],
        stale: None,
    };
    let Type::Path(model) = base.model else {
        return fallback;
    };
    if model.qself.is_some() {
        return fallback;
    }
    let written = path_segments(&model.path);
    let resolved = uses.resolve_path(&model.path);
    let old_module = match resolved.split_last() {
        Some((_, module)) if !module.is_empty() => module,
        _ => return fallback,
    };
    let absolute = absolute_path(old_module, &spec.module, &spec.crate_root);
    let stale = (absolute != package).then(|| old_module.join("::"));

    match written.as_slice() {
        [single] => {
            let mut bare: Vec<String> = uses.entries().iter().map(|e| e.local.clone()).collect();
            bare.push(spec.model.type_name.clone());
            if let (Some(_), Some(entry)) = (&stale, uses.get(single)) {
                let mut new_path = package.to_vec();
                new_path.extend(entry.path.last().cloned());
                let rewrite = UseRewrite {
                    item: entry.item,
                    local: &entry.local,
                    new_path: &new_path,
                    new_local: &entry.local,
                };
                rewrite_use_item(file, uses, map, &rewrite, edits);
                norm.bind(&entry.local, new_path.clone());
            }
            Binding {
                qualifier: package_path,
                bare,
                stale,
            }
        }
        [alias, _] if uses.get(alias).is_some() => {
            let Some(entry) = uses.get(alias) else {
                return fallback;
            };
            if stale.is_none() {
                return Binding {
                    qualifier: alias.clone(),
                    bare: Vec::new(),
                    stale,
                };
            }
            let new_local = if entry.is_renamed() {
                entry.local.clone()
            } else {
                choose_local(uses, entry, package)
            };
            let rewrite = UseRewrite {
                item: entry.item,
                local: alias,
                new_path: package,
                new_local: &new_local,
            };
            rewrite_use_item(file, uses, map, &rewrite, edits);
            if new_local != *alias {
                rename_prefix(file, map, std::slice::from_ref(alias), &new_local, edits);
            }
            norm.bind(&new_local, package.to_vec());
            Binding {
                qualifier: new_local,
                bare: Vec::new(),
                stale,
            }
        }
        _ => {
            let prefix = &written[..written.len() - 1];
            let qualifier = if stale.is_some() {
                rename_prefix(file, map, prefix, &package_path, edits);
                package_path
            } else {
                prefix.join("::")
            };
            Binding {
                qualifier,
                bare: Vec::new(),
                stale,
            }
        }
    }
}

/// Local name for the moved package: its last segment, or a collision-free
/// alias when that name is taken by another import.
fn choose_local(uses: &UseMap, stale: &UseEntry, package: &[String]) -> String {
    let default = package.last().cloned().unwrap_or_default();
    match uses.get(&default) {
        Some(other) if other.local != stale.local && other.path != package => {
            let target = package.join("::");
            resolve_aliases([other.path_string(), target.clone()])
                .remove(&target)
                .unwrap_or(default)
        }
        _ => default,
    }
}
