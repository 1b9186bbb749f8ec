//! Message composer

use std::{fmt, sync::Arc};

use serde_json::Value;
use tracing::debug;

use super::{
    errors::ComposeError,
    message::{ExtraFields, Message},
    templates::{RenderContext, TemplateRenderer},
};

/// Builds messages from raw fields or rendered templates
#[derive(Clone)]
pub struct EmailComposer {
    renderer: Arc<dyn TemplateRenderer>,
    context: RenderContext,
}

impl EmailComposer {
    /// Creates a composer rendering templates with `renderer` in `context`.
    pub fn new(renderer: Arc<dyn TemplateRenderer>, context: RenderContext) -> Self {
        Self { renderer, context }
    }

    /// Composes a message from raw fields. See [`Message::compose`].
    pub fn compose(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        body: &str,
        extra: ExtraFields,
    ) -> Result<Message, ComposeError> {
        Message::compose(from, to, subject, body, extra)
    }

    /// Renders `template` with `vars` and composes a message from the result.
    ///
    /// # Returns
    /// A [`Result`] which is [`Ok`] containing the [`Message`], or an [`Err`] containing
    /// the renderer's [`RenderError`](super::RenderError) wrapped in
    /// [`ComposeError::Render`], or a [`ComposeError::ReservedField`] from composing.
    pub fn compose_from_template(
        &self,
        template: &str,
        vars: &Value,
        from: &str,
        to: &str,
        subject: &str,
        extra: ExtraFields,
    ) -> Result<Message, ComposeError> {
        debug!(template, "rendering email template");

        let body = self.renderer.render(template, vars, &self.context)?;

        self.compose(from, to, subject, &body, extra)
    }
}

impl fmt::Debug for EmailComposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailComposer")
            .field("renderer", &"TemplateRenderer")
            .field("context", &self.context)
            .finish()
    }
}
