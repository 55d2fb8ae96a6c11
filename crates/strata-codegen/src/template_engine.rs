//! Template engine for service boilerplate using Handlebars.
//!
//! Templates emit Rust source that is parsed and pretty-printed afterwards,
//! so they only need to be syntactically valid, not neatly laid out.
//!
//! # Examples
//!
//! ```
//! use strata_codegen::template_engine::{SERVICE_TEMPLATE, TemplateEngine};
//!
//! let engine = TemplateEngine::new().unwrap();
//! // Strict mode: a missing variable is an error, not an empty string.
//! assert!(engine.render(SERVICE_TEMPLATE, &serde_json::json!({})).is_err());
//! ```

use handlebars::{Handlebars, no_escape};
use serde::Serialize;
use strata_core::{Error, Result};

/// Name of the service boilerplate template.
pub const SERVICE_TEMPLATE: &str = "service/action";

/// Template engine with the built-in templates registered.
#[derive(Debug)]
pub struct TemplateEngine<'a> {
    handlebars: Handlebars<'a>,
}

impl TemplateEngine<'_> {
    /// Creates an engine with the built-in templates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] if a built-in template fails to register.
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();

        // Strict mode: fail on missing variables
        handlebars.set_strict_mode(true);
        // Output is Rust, not HTML
        handlebars.register_escape_fn(no_escape);

        handlebars
            .register_template_string(
                SERVICE_TEMPLATE,
                include_str!("../templates/service/action.rs.hbs"),
            )
            .map_err(|e| Error::Template {
                message: format!("failed to register {SERVICE_TEMPLATE}: {e}"),
            })?;

        Ok(Self { handlebars })
    }

    /// Renders `template_name` with `context`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] if the template is unknown or a variable
    /// is missing.
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        self.handlebars
            .render(template_name, context)
            .map_err(|e| Error::Template {
                message: format!("rendering {template_name} failed: {e}"),
            })
    }

    #[cfg(test)]
    fn register_template_string(&mut self, name: &str, template: &str) -> Result<()> {
        self.handlebars
            .register_template_string(name, template)
            .map_err(|e| Error::Template {
                message: format!("failed to register template '{name}': {e}"),
            })
    }
}
