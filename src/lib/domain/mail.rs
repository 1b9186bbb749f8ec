//! Outgoing mail: composing messages and deciding how they are delivered.

mod composer;
mod dispatch;
mod errors;
mod message;
mod session;
mod templates;
mod text;

pub use composer::EmailComposer;
pub use dispatch::{Dispatched, Dispatcher, SendAction, SendOptions, Spawner, TokioSpawner};
pub use errors::{ComposeError, MailerError, RenderError};
pub use message::{ExtraFields, Message, Messages};
pub use session::{BatchSession, DeliveryReceipt, MailerFactory};
pub use templates::{RenderContext, TemplateRegistry, TemplateRenderer};
pub use text::html_to_text;
