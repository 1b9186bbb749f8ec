//! Mail state shared by every request

use std::{fmt, sync::Arc};

use crate::{
    domain::mail::{MailerFactory, RenderContext, Spawner, TemplateRenderer, TokioSpawner},
    infrastructure::{config::PostmarkConfig, postmark::PostmarkClient},
};

/// Everything a request needs to compose and send mail
///
/// Use it as the router state, or implement [`FromRef`](axum::extract::FromRef) for your
/// own state to hand it out.
pub struct MailState<F: MailerFactory> {
    /// The Postmark configuration
    pub config: PostmarkConfig,

    /// Creates batch sessions
    pub factory: Arc<F>,

    /// Renders email templates
    pub renderer: Arc<dyn TemplateRenderer>,

    /// Starts background sends
    pub spawner: Arc<dyn Spawner>,

    /// Request details offered to templates
    pub context: RenderContext,
}

impl<F: MailerFactory> MailState<F> {
    /// Creates mail state sending background batches on the tokio runtime
    pub fn new(
        config: PostmarkConfig,
        factory: F,
        renderer: impl TemplateRenderer,
        context: RenderContext,
    ) -> Self {
        Self {
            config,
            factory: Arc::new(factory),
            renderer: Arc::new(renderer),
            spawner: Arc::new(TokioSpawner),
            context,
        }
    }

    /// Replaces the spawner background sends start on
    pub fn with_spawner(mut self, spawner: impl Spawner) -> Self {
        self.spawner = Arc::new(spawner);
        self
    }
}

impl MailState<PostmarkClient> {
    /// Creates mail state delivering through the Postmark API named in `config`
    pub fn postmark(
        config: PostmarkConfig,
        renderer: impl TemplateRenderer,
        context: RenderContext,
    ) -> Self {
        let client = PostmarkClient::new(config.api_url.clone());

        Self::new(config, client, renderer, context)
    }
}

impl<F: MailerFactory> Clone for MailState<F> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            factory: self.factory.clone(),
            renderer: self.renderer.clone(),
            spawner: self.spawner.clone(),
            context: self.context.clone(),
        }
    }
}

impl<F: MailerFactory> fmt::Debug for MailState<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailState")
            .field("should_join_tx", &self.config.should_join_tx)
            .field("api_url", &self.config.api_url)
            .field("factory", &"MailerFactory")
            .field("renderer", &"TemplateRenderer")
            .field("spawner", &"Spawner")
            .field("context", &self.context)
            .finish()
    }
}

#[cfg(test)]
use crate::domain::mail::tests::{MockMailerFactory, MockTemplateRenderer};

#[cfg(test)]
pub fn test_state(
    factory: Option<MockMailerFactory>,
    renderer: Option<MockTemplateRenderer>,
    config: Option<PostmarkConfig>,
) -> MailState<MockMailerFactory> {
    let config = config.unwrap_or_else(|| PostmarkConfig {
        api_key: Some("K".to_string()),
        ..PostmarkConfig::default()
    });

    let context = RenderContext {
        base_url: "https://example.com".to_string(),
    };

    MailState::new(
        config,
        factory.unwrap_or_default(),
        renderer.unwrap_or_default(),
        context,
    )
}

#[cfg(test)]
mod tests {
    use crate::domain::mail::TemplateRegistry;

    use super::*;

    #[test]
    fn test_postmark_state_uses_configured_api_url() {
        let config = PostmarkConfig {
            api_url: "http://localhost:8080".to_string(),
            ..PostmarkConfig::default()
        };

        let state = MailState::postmark(config, TemplateRegistry::new(), RenderContext::default());

        assert!(format!("{state:?}").contains("http://localhost:8080"));
        assert!(state.config.should_join_tx);
    }
}
