//! Fresh service boilerplate.

use serde::Serialize;
use strata_core::{Error, HookShape, Result};

use super::ServiceSpec;
use crate::resolver::Imports;
use crate::syntax::{qualify_type, render_type};
use crate::template_engine::{SERVICE_TEMPLATE, TemplateEngine};

#[derive(Debug, Serialize)]
struct ServiceTemplate {
    uses: Vec<String>,
    framework: String,
    service: String,
    types: String,
    struct_name: String,
    model_type: String,
    payload_type: String,
    result_type: String,
    method: String,
    hooks: Vec<HookTemplate>,
}

#[derive(Debug, Serialize)]
struct HookTemplate {
    name: String,
    param: Option<String>,
    binding: Option<String>,
}

fn hook(name: String, shape: HookShape, var: &str, model_type: &str) -> HookTemplate {
    let (binding, param) = match shape {
        HookShape::Single => (var.to_string(), format!("{var}: &mut {model_type}")),
        HookShape::Many => (format!("{var}s"), format!("{var}s: &mut [{model_type}]")),
        HookShape::List => (format!("{var}s"), format!("{var}s: &mut Vec<{model_type}>")),
        HookShape::Context => {
            return HookTemplate {
                name,
                param: None,
                binding: None,
            };
        }
    };
    HookTemplate {
        name,
        param: Some(param),
        binding: Some(binding),
    }
}

/// Renders the boilerplate of a service file nobody has written yet.
pub(super) fn render_service(engine: &TemplateEngine<'_>, spec: &ServiceSpec<'_>) -> Result<String> {
    let framework = &spec.framework;
    let service_mod = format!("{framework}::service");
    let types_mod = format!("{framework}::types");
    let package = spec.model.package_path.as_str();
    let imports = Imports::from_paths([service_mod.as_str(), types_mod.as_str(), package]);
    let alias = imports.local_name(package);

    let model_type = render_type(&qualify_type(&spec.model.type_name, &alias, &[])?);
    let payload_type = render_type(&qualify_type(spec.payload(), &alias, &[])?);
    let result_type = render_type(&qualify_type(spec.result(), &alias, &[])?);

    let method = spec.method().to_string();
    let (before, after) = spec.action.phase.hooks();
    let var = spec.model.var_name.as_str();
    let hooks = vec![
        hook(format!("{method}_before"), before, var, &model_type),
        hook(format!("{method}_after"), after, var, &model_type),
    ];

    let context = ServiceTemplate {
        uses: imports.use_lines(),
        framework: framework.clone(),
        service: imports.local_name(&service_mod),
        types: imports.local_name(&types_mod),
        struct_name: spec.struct_name.clone(),
        model_type,
        payload_type,
        result_type,
        method,
        hooks,
    };
    let rendered = engine.render(SERVICE_TEMPLATE, &context)?;
    let parsed = syn::parse_str::<syn::File>(&rendered).map_err(|e| Error::Codegen {
        target: spec.path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(prettyplease::unparse(&parsed))
}
