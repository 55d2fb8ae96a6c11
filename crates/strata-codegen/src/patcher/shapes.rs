//! Recognising generated method shapes in hand-edited service files.

use strata_core::HookShape;
use syn::{FnArg, GenericArgument, PathArguments, ReturnType, Signature, Type};

/// Shape of a method the generator once emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodShape {
    /// The phase method: `(&self, ctx, req: Req) -> Result<Rsp>`
    Action,
    /// A lifecycle hook around the phase method
    Hook(HookShape),
}

/// Classifies `sig` against the methods generated for phase `method`.
///
/// Only [`MethodShape::Action`] tracks the design; hooks are recognised so
/// they can be left alone.
#[must_use]
pub fn classify(sig: &Signature, method: &str) -> Option<MethodShape> {
    sig.receiver()?;
    let typed: Vec<&Type> = sig
        .inputs
        .iter()
        .filter_map(|arg| match arg {
            FnArg::Typed(t) => Some(&*t.ty),
            FnArg::Receiver(_) => None,
        })
        .collect();

    let name = sig.ident.to_string();
    if name == method {
        return (typed.len() == 2).then_some(MethodShape::Action);
    }
    let is_hook = name
        .strip_prefix(method)
        .is_some_and(|rest| rest == "_before" || rest == "_after");
    if !is_hook {
        return None;
    }
    match typed.as_slice() {
        [_] => Some(MethodShape::Hook(HookShape::Context)),
        [_, models] => hook_shape(models).map(MethodShape::Hook),
        _ => None,
    }
}

fn hook_shape(ty: &Type) -> Option<HookShape> {
    let Type::Reference(reference) = ty else {
        return None;
    };
    reference.mutability?;
    match &*reference.elem {
        Type::Slice(_) => Some(HookShape::Many),
        Type::Path(p) if p.path.segments.last().is_some_and(|s| s.ident == "Vec") => {
            Some(HookShape::List)
        }
        Type::Path(_) => Some(HookShape::Single),
        _ => None,
    }
}

/// Request parameter type of an action-shaped method.
#[must_use]
pub fn request_type(sig: &Signature) -> Option<&Type> {
    sig.inputs
        .iter()
        .filter_map(|arg| match arg {
            FnArg::Typed(t) => Some(&*t.ty),
            FnArg::Receiver(_) => None,
        })
        .nth(1)
}

/// `T` in a `-> …Result<T>` return type.
#[must_use]
pub fn response_type(sig: &Signature) -> Option<&Type> {
    let ReturnType::Type(_, ty) = &sig.output else {
        return None;
    };
    let Type::Path(path) = &**ty else {
        return None;
    };
    let last = path.path.segments.last()?;
    if last.ident != "Result" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &last.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(t) => Some(t),
        _ => None,
    })
}
