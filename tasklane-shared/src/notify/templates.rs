/// Email template rendering
///
/// Templates are embedded at compile time from `templates/` and rendered with
/// Tera. HTML autoescaping is on for every `.html` template.

use serde_json::Value;
use tera::{Context, Tera};

use super::NotifyError;

/// Password reset email, params: `name`, `password`
pub const FORGOTTEN_PASSWORD: &str = "forgotten_password.html";

/// Project invitation email, params: `inviter`, `project`, `invite_link`
pub const INVITE: &str = "invite.html";

const TEMPLATES: [(&str, &str); 2] = [
    (
        FORGOTTEN_PASSWORD,
        include_str!("../../templates/forgotten_password.html"),
    ),
    (INVITE, include_str!("../../templates/invite.html")),
];

/// Renders named templates to HTML
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Loads the embedded templates
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Template` if a template fails to parse
    pub fn new() -> Result<Self, NotifyError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)
            .map_err(|e| NotifyError::Template(e.to_string()))?;
        Ok(Self { tera })
    }

    /// Renders `template` with the keys of `params` as variables
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Template` for an unknown template, a non-object
    /// `params`, or a missing variable
    pub fn render(&self, template: &str, params: &Value) -> Result<String, NotifyError> {
        let context = Context::from_value(params.clone())
            .map_err(|e| NotifyError::Template(format!("{}: {}", template, e)))?;

        self.tera
            .render(template, &context)
            .map_err(|e| NotifyError::Template(format!("{}: {}", template, e)))
    }

    pub fn has_template(&self, template: &str) -> bool {
        self.tera.get_template_names().any(|name| name == template)
    }
}
