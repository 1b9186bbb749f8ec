//! Dispatch decisions: when and how a batch is sent

use std::{fmt, sync::Arc};

use futures::{future::BoxFuture, FutureExt};
use tracing::{debug, error};

use crate::domain::transactions::{AfterCommitHook, TransactionHooks};

use super::{
    errors::MailerError,
    message::Messages,
    session::{BatchSession, DeliveryReceipt, MailerFactory},
};

/// How a send call should be carried out
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Whether to defer sending until the unit of work commits.
    /// `None` falls back to the configured default.
    pub should_join_tx: Option<bool>,

    /// Whether to send on a detached background task
    pub in_background: bool,
}

impl SendOptions {
    /// Send now, whatever the configured default
    pub fn immediately() -> Self {
        Self {
            should_join_tx: Some(false),
            in_background: false,
        }
    }

    /// Send once the unit of work commits, whatever the configured default
    pub fn after_commit() -> Self {
        Self {
            should_join_tx: Some(true),
            in_background: false,
        }
    }

    /// Send on a detached background task
    pub fn in_background(mut self) -> Self {
        self.in_background = true;
        self
    }
}

/// What a send call did
#[derive(Debug, PartialEq, Eq)]
pub enum Dispatched {
    /// The batch was sent and the provider answered with these receipts
    Sent(Vec<DeliveryReceipt>),

    /// A background task was started to send the batch
    Spawned,

    /// Sending was joined to the unit of work
    Deferred,
}

/// Starts detached tasks
///
/// Tasks are fire-and-forget: nothing awaits them and their outcome never reaches the
/// code that spawned them.
pub trait Spawner: Send + Sync + 'static {
    /// Starts `task` and returns without waiting for it
    fn spawn(&self, task: BoxFuture<'static, ()>);
}

/// A [`Spawner`] running tasks on the current tokio runtime
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSpawner;

impl Spawner for TokioSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        drop(tokio::spawn(task));
    }
}

/// The operation that triggers delivery of a populated session
pub enum SendAction<S> {
    /// Send on the calling task
    Direct(S),

    /// Start a background task that sends
    Background {
        /// The populated session
        session: S,

        /// Starts the background task
        spawner: Arc<dyn Spawner>,
    },
}

impl<S: BatchSession> SendAction<S> {
    /// Runs the action.
    ///
    /// A direct action returns the provider's receipts. A background action returns
    /// [`Dispatched::Spawned`] as soon as the task is started; a failure inside the
    /// task is logged and otherwise lost.
    pub async fn run(self) -> Result<Dispatched, MailerError> {
        match self {
            SendAction::Direct(session) => Ok(Dispatched::Sent(session.send().await?)),
            SendAction::Background { session, spawner } => {
                spawner.spawn(
                    async move {
                        match session.send().await {
                            Ok(receipts) => debug!(receipts = receipts.len(), "background batch sent"),
                            Err(err) => error!(error = %err, "background batch failed"),
                        }
                    }
                    .boxed(),
                );

                Ok(Dispatched::Spawned)
            }
        }
    }

    /// Wraps the action as an after-commit hook. Failures are logged.
    pub fn into_hook(self) -> AfterCommitHook {
        Box::new(move || {
            async move {
                if let Err(err) = self.run().await {
                    error!(error = %err, "after-commit send failed");
                }
            }
            .boxed()
        })
    }
}

impl<S> fmt::Debug for SendAction<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendAction::Direct(_) => f.write_str("SendAction::Direct"),
            SendAction::Background { .. } => f.write_str("SendAction::Background"),
        }
    }
}

/// Sends batches for one request
///
/// Each call to [`Dispatcher::send`] obtains its own session from the factory, so no
/// two calls ever share pending messages.
pub struct Dispatcher<F: MailerFactory> {
    factory: Arc<F>,
    api_key: Option<String>,
    hooks: Arc<dyn TransactionHooks>,
    spawner: Arc<dyn Spawner>,
    default_join_tx: bool,
}

impl<F: MailerFactory> Dispatcher<F> {
    /// Creates a dispatcher.
    ///
    /// # Arguments
    /// * `factory` - Creates a session per send.
    /// * `api_key` - The credential sessions are created with.
    /// * `hooks` - The unit of work deferred sends join.
    /// * `spawner` - Starts background sends.
    /// * `default_join_tx` - Whether sends join the unit of work when the caller does not say.
    pub fn new(
        factory: Arc<F>,
        api_key: Option<String>,
        hooks: Arc<dyn TransactionHooks>,
        spawner: Arc<dyn Spawner>,
        default_join_tx: bool,
    ) -> Self {
        Self {
            factory,
            api_key,
            hooks,
            spawner,
            default_join_tx,
        }
    }

    /// Returns a fresh, empty session bound to the configured credential
    pub fn mailer(&self) -> F::Session {
        self.factory.create(self.api_key.clone())
    }

    /// Whether sends join the unit of work when the caller does not say
    pub fn default_join_tx(&self) -> bool {
        self.default_join_tx
    }

    /// Sends `messages`, now, in the background, or once the unit of work commits.
    ///
    /// # Arguments
    /// * `messages` - A single [`Message`](super::Message) or a batch.
    /// * `options` - See [`SendOptions`].
    ///
    /// # Returns
    /// - [`Dispatched::Deferred`] when the send was joined to the unit of work.
    /// - [`Dispatched::Spawned`] when a background task was started.
    /// - [`Dispatched::Sent`] with the receipts of a direct send.
    /// - [`Err`] with the [`MailerError`] of a failed direct send.
    pub async fn send(
        &self,
        messages: impl Into<Messages>,
        options: SendOptions,
    ) -> Result<Dispatched, MailerError> {
        let messages = messages.into();
        let should_join_tx = options.should_join_tx.unwrap_or(self.default_join_tx);

        debug!(
            messages = messages.len(),
            should_join_tx,
            in_background = options.in_background,
            "dispatching email batch"
        );

        let mut session = self.mailer();
        session.set_messages(messages.into_inner());

        let action = if options.in_background {
            SendAction::Background {
                session,
                spawner: self.spawner.clone(),
            }
        } else {
            SendAction::Direct(session)
        };

        if should_join_tx {
            self.hooks.join(action.into_hook());

            return Ok(Dispatched::Deferred);
        }

        action.run().await
    }
}

impl<F: MailerFactory> Clone for Dispatcher<F> {
    fn clone(&self) -> Self {
        Self {
            factory: self.factory.clone(),
            api_key: self.api_key.clone(),
            hooks: self.hooks.clone(),
            spawner: self.spawner.clone(),
            default_join_tx: self.default_join_tx,
        }
    }
}

impl<F: MailerFactory> fmt::Debug for Dispatcher<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("factory", &"MailerFactory")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("default_join_tx", &self.default_join_tx)
            .finish()
    }
}
