//! Request-scoped mail helpers

use std::{fmt, sync::Arc};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use serde_json::Value;
use tracing::error;

use crate::domain::{
    mail::{
        ComposeError, Dispatched, Dispatcher, EmailComposer, ExtraFields, MailerError,
        MailerFactory, Message, Messages, SendOptions,
    },
    transactions::{TransactionHooks, UnitOfWork},
};

use super::{errors::ApiError, state::MailState};

/// Mail helpers bound to the current request
///
/// The join default is read from the configuration once, when the extractor is built.
/// Extraction fails with a 500 if the request is not running inside
/// [`transaction_manager`](super::transaction::transaction_manager).
pub struct Mail<F: MailerFactory> {
    dispatcher: Dispatcher<F>,
    composer: EmailComposer,
}

impl<F: MailerFactory> Mail<F> {
    /// Binds the mail helpers to `hooks`
    pub fn new(state: &MailState<F>, hooks: impl TransactionHooks) -> Self {
        Self {
            dispatcher: Dispatcher::new(
                state.factory.clone(),
                state.config.api_key.clone(),
                Arc::new(hooks),
                state.spawner.clone(),
                state.config.should_join_tx,
            ),
            composer: EmailComposer::new(state.renderer.clone(), state.context.clone()),
        }
    }

    /// Returns a batch session configured with the API key
    ///
    /// Every call creates a new session; nothing is cached on the request. Sessions hold
    /// their pending messages, so handlers that need one session across several steps
    /// should keep the value this returns.
    pub fn mailer(&self) -> F::Session {
        self.dispatcher.mailer()
    }

    /// Sends one or more messages. See [`Dispatcher::send`].
    pub async fn send_email(
        &self,
        messages: impl Into<Messages>,
        options: SendOptions,
    ) -> Result<Dispatched, MailerError> {
        self.dispatcher.send(messages, options).await
    }

    /// Composes a message from raw fields. See [`Message::compose`].
    pub fn email_factory(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        body: &str,
        extra: ExtraFields,
    ) -> Result<Message, ComposeError> {
        self.composer.compose(from, to, subject, body, extra)
    }

    /// Composes a message from a rendered template.
    /// See [`EmailComposer::compose_from_template`].
    pub fn render_email(
        &self,
        template: &str,
        vars: &Value,
        from: &str,
        to: &str,
        subject: &str,
        extra: ExtraFields,
    ) -> Result<Message, ComposeError> {
        self.composer
            .compose_from_template(template, vars, from, to, subject, extra)
    }

    /// The dispatcher behind [`Mail::send_email`]
    pub fn dispatcher(&self) -> &Dispatcher<F> {
        &self.dispatcher
    }
}

impl<F: MailerFactory> Clone for Mail<F> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
            composer: self.composer.clone(),
        }
    }
}

impl<F: MailerFactory> fmt::Debug for Mail<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mail")
            .field("dispatcher", &self.dispatcher)
            .field("composer", &self.composer)
            .finish()
    }
}

#[async_trait]
impl<S, F> FromRequestParts<S> for Mail<F>
where
    F: MailerFactory,
    MailState<F>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = MailState::<F>::from_ref(state);

        let unit_of_work = parts.extensions.get::<UnitOfWork>().cloned().ok_or_else(|| {
            error!("request has no unit of work; is transaction_manager layered?");

            ApiError::new_500("Mail is not available for this request")
        })?;

        Ok(Self::new(&state, unit_of_work))
    }
}
