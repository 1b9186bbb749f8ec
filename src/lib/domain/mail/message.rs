//! Email message

use serde::Serialize;
use serde_json::{Map, Value};

use super::{errors::ComposeError, text::html_to_text};

/// Extra named attributes passed through to the mail provider untouched
pub type ExtraFields = Map<String, Value>;

/// Payload names of the fields [`Message::compose`] fills in itself
const COMPOSED_FIELDS: [&str; 5] = ["From", "To", "Subject", "HtmlBody", "TextBody"];

/// Email message
///
/// Serializes to the field names the Postmark API expects, with any extra fields
/// flattened alongside them.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Message {
    from: String,
    to: String,
    subject: String,
    html_body: String,
    text_body: String,
    #[serde(flatten)]
    extra: ExtraFields,
}

impl Message {
    /// Composes a message from raw fields.
    ///
    /// The subject and HTML body are trimmed and the plain text body is derived from the
    /// HTML. Addresses are not validated here; the mail provider rejects bad ones when
    /// the message is sent.
    ///
    /// # Returns
    /// A [`Result`] which is [`Ok`] containing the [`Message`], or an [`Err`] containing
    /// [`ComposeError::ReservedField`] if `extra` names one of the composed fields
    /// (compared case-insensitively).
    pub fn compose(
        from: &str,
        to: &str,
        subject: &str,
        body: &str,
        extra: ExtraFields,
    ) -> Result<Self, ComposeError> {
        if let Some(key) = extra
            .keys()
            .find(|key| COMPOSED_FIELDS.iter().any(|field| key.eq_ignore_ascii_case(field)))
        {
            return Err(ComposeError::ReservedField(key.clone()));
        }

        Ok(Self {
            from: from.to_string(),
            to: to.to_string(),
            subject: subject.trim().to_string(),
            html_body: body.trim().to_string(),
            text_body: html_to_text(body).trim().to_string(),
            extra,
        })
    }

    /// The sender address
    pub fn sender(&self) -> &str {
        &self.from
    }

    /// The recipient address
    pub fn recipient(&self) -> &str {
        &self.to
    }

    /// The subject line
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The HTML body
    pub fn html_body(&self) -> &str {
        &self.html_body
    }

    /// The plain text body
    pub fn text_body(&self) -> &str {
        &self.text_body
    }

    /// Extra provider fields
    pub fn extra(&self) -> &ExtraFields {
        &self.extra
    }
}

/// One or more messages handed to a single send call
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Messages(Vec<Message>);

impl Messages {
    /// Number of messages in the batch
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the batch is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Unwraps the batch into its messages
    pub fn into_inner(self) -> Vec<Message> {
        self.0
    }
}

impl From<Message> for Messages {
    fn from(message: Message) -> Self {
        Self(vec![message])
    }
}

impl From<Vec<Message>> for Messages {
    fn from(messages: Vec<Message>) -> Self {
        Self(messages)
    }
}

impl<const N: usize> From<[Message; N]> for Messages {
    fn from(messages: [Message; N]) -> Self {
        Self(messages.into())
    }
}

impl FromIterator<Message> for Messages {
    fn from_iter<I: IntoIterator<Item = Message>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
