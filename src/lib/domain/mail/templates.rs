//! Email templates

use std::{collections::HashMap, fmt};

use askama::Template;
use serde::de::DeserializeOwned;
use serde_json::Value;

#[cfg(test)]
use mockall::mock;

use super::errors::RenderError;

/// Request details made available to templates
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderContext {
    /// The base URL of the application
    pub base_url: String,
}

/// Renders a named template into an HTML body
pub trait TemplateRenderer: Send + Sync + 'static {
    /// Renders `template` with `vars`.
    ///
    /// # Arguments
    /// * `template` - The name the template is known by.
    /// * `vars` - The template variables.
    /// * `context` - The [`RenderContext`] of the current request.
    ///
    /// # Returns
    /// A [`Result`] which is [`Ok`] containing the rendered text,
    /// or an [`Err`] containing a [`RenderError`] if the template could not be rendered.
    fn render(
        &self,
        template: &str,
        vars: &Value,
        context: &RenderContext,
    ) -> Result<String, RenderError>;
}

#[cfg(test)]
mock! {
    pub TemplateRenderer {}

    impl TemplateRenderer for TemplateRenderer {
        fn render(&self, template: &str, vars: &Value, context: &RenderContext) -> Result<String, RenderError>;
    }
}

type RenderFn = Box<dyn Fn(Value) -> Result<String, RenderError> + Send + Sync>;

/// A [`TemplateRenderer`] over askama templates registered by name
///
/// Variables are deserialized into the template struct, so every field the template
/// declares must be present in `vars`. The request's `base_url` is offered to templates
/// unless the caller already set one.
#[derive(Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, RenderFn>,
}

impl TemplateRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers template `T` under `name`, replacing any previous registration.
    pub fn register<T>(mut self, name: impl Into<String>) -> Self
    where
        T: Template + DeserializeOwned + 'static,
    {
        self.templates.insert(
            name.into(),
            Box::new(|vars: Value| -> Result<String, RenderError> {
                let template: T = serde_json::from_value(vars)?;

                Ok(template.render()?)
            }),
        );

        self
    }
}

impl TemplateRenderer for TemplateRegistry {
    fn render(
        &self,
        template: &str,
        vars: &Value,
        context: &RenderContext,
    ) -> Result<String, RenderError> {
        let render = self
            .templates
            .get(template)
            .ok_or_else(|| RenderError::UnknownTemplate(template.to_string()))?;

        let mut vars = vars.clone();

        if let Value::Object(map) = &mut vars {
            map.entry("base_url")
                .or_insert_with(|| Value::String(context.base_url.clone()));
        }

        render(vars)
    }
}

impl fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.templates.keys().collect();
        names.sort();

        f.debug_struct("TemplateRegistry")
            .field("templates", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, Deserialize, Template)]
    #[template(source = "<p>Hello {{ name }}</p>", ext = "html")]
    struct GreetingTemplate {
        name: String,
    }

    #[derive(Debug, Deserialize, Template)]
    #[template(
        source = "<a href=\"{{ base_url|safe }}/confirm?token={{ token }}\">Confirm</a>",
        ext = "html"
    )]
    struct ConfirmTemplate {
        base_url: String,
        token: String,
    }

    fn context() -> RenderContext {
        RenderContext {
            base_url: "https://example.com".to_string(),
        }
    }

    #[test]
    fn test_render_registered_template() -> TestResult {
        let registry = TemplateRegistry::new().register::<GreetingTemplate>("greeting");

        let html = registry.render("greeting", &json!({ "name": "Ada" }), &context())?;

        assert_eq!(html, "<p>Hello Ada</p>");

        Ok(())
    }

    #[test]
    fn test_render_escapes_html_variables() -> TestResult {
        let registry = TemplateRegistry::new().register::<GreetingTemplate>("greeting");

        let html = registry.render("greeting", &json!({ "name": "<b>" }), &context())?;

        assert_eq!(html, "<p>Hello &lt;b&gt;</p>");

        Ok(())
    }

    #[test]
    fn test_render_offers_base_url_from_context() -> TestResult {
        let registry = TemplateRegistry::new().register::<ConfirmTemplate>("confirm");

        let html = registry.render("confirm", &json!({ "token": "abc" }), &context())?;

        assert_eq!(
            html,
            "<a href=\"https://example.com/confirm?token=abc\">Confirm</a>"
        );

        Ok(())
    }

    #[test]
    fn test_render_keeps_caller_base_url() -> TestResult {
        let registry = TemplateRegistry::new().register::<ConfirmTemplate>("confirm");

        let html = registry.render(
            "confirm",
            &json!({ "token": "abc", "base_url": "https://other.example" }),
            &context(),
        )?;

        assert!(html.starts_with("<a href=\"https://other.example/confirm"));

        Ok(())
    }

    #[test]
    fn test_render_unknown_template() {
        let registry = TemplateRegistry::new();

        let result = registry.render("missing", &json!({}), &context());

        assert!(matches!(result, Err(RenderError::UnknownTemplate(name)) if name == "missing"));
    }

    #[test]
    fn test_render_missing_variables() {
        let registry = TemplateRegistry::new().register::<GreetingTemplate>("greeting");

        let result = registry.render("greeting", &json!({}), &context());

        assert!(matches!(result, Err(RenderError::InvalidVariables(_))));
    }

    #[test]
    fn test_debug_lists_template_names() {
        let registry = TemplateRegistry::new()
            .register::<GreetingTemplate>("greeting")
            .register::<ConfirmTemplate>("confirm");

        assert_eq!(
            format!("{registry:?}"),
            "TemplateRegistry { templates: [\"confirm\", \"greeting\"] }"
        );
    }
}
