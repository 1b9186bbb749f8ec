//! Batch mailer sessions

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

#[cfg(test)]
use mockall::mock;

use super::{errors::MailerError, message::Message};

/// The provider's verdict on one message of a batch
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeliveryReceipt {
    /// The recipient the message was addressed to
    #[serde(default)]
    pub to: Option<String>,

    /// The provider's message ID, present when the message was accepted
    #[serde(default, rename = "MessageID")]
    pub message_id: Option<Uuid>,

    /// When the provider accepted the message
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,

    /// `0` on success, the provider's error code otherwise
    pub error_code: i64,

    /// The provider's status message
    pub message: String,
}

impl DeliveryReceipt {
    /// Whether the provider accepted the message
    pub fn is_success(&self) -> bool {
        self.error_code == 0
    }
}

/// A single-use batch of pending messages bound to an API credential
#[async_trait]
pub trait BatchSession: Send + Sync + 'static {
    /// Replaces the pending messages
    fn set_messages(&mut self, messages: Vec<Message>);

    /// Sends the pending messages in one API call
    ///
    /// # Returns
    /// - [`Ok`] with one [`DeliveryReceipt`] per message the provider processed.
    /// - [`Err`] with a [`MailerError`] when the batch as a whole was refused or could
    ///   not be delivered to the provider.
    async fn send(&self) -> Result<Vec<DeliveryReceipt>, MailerError>;
}

/// Creates batch sessions
pub trait MailerFactory: Send + Sync + 'static {
    /// The session type this factory produces
    type Session: BatchSession;

    /// Creates a fresh, empty session using `api_key`.
    ///
    /// A missing key is not an error here; the provider rejects it at send time.
    fn create(&self, api_key: Option<String>) -> Self::Session;
}

#[cfg(test)]
mock! {
    pub BatchSession {}

    #[async_trait]
    impl BatchSession for BatchSession {
        fn set_messages(&mut self, messages: Vec<Message>);
        async fn send(&self) -> Result<Vec<DeliveryReceipt>, MailerError>;
    }
}

#[cfg(test)]
mock! {
    pub MailerFactory {}

    impl MailerFactory for MailerFactory {
        type Session = MockBatchSession;

        fn create(&self, api_key: Option<String>) -> MockBatchSession;
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn test_deserialize_accepted_receipt() -> TestResult {
        let receipt: DeliveryReceipt = serde_json::from_value(json!({
            "ErrorCode": 0,
            "Message": "OK",
            "MessageID": "b7bc2f4a-e38e-4336-af7d-e6c392c2f817",
            "SubmittedAt": "2010-11-26T12:01:05.1794748-05:00",
            "To": "receiver1@example.com"
        }))?;

        assert!(receipt.is_success());
        assert_eq!(receipt.to.as_deref(), Some("receiver1@example.com"));
        assert_eq!(
            receipt.message_id,
            Some(Uuid::parse_str("b7bc2f4a-e38e-4336-af7d-e6c392c2f817")?)
        );
        assert!(receipt.submitted_at.is_some());

        Ok(())
    }

    #[test]
    fn test_deserialize_failed_receipt() -> TestResult {
        let receipt: DeliveryReceipt = serde_json::from_value(json!({
            "ErrorCode": 300,
            "Message": "Invalid 'To' address: 'not an email'."
        }))?;

        assert!(!receipt.is_success());
        assert!(receipt.message_id.is_none());
        assert!(receipt.to.is_none());

        Ok(())
    }
}
