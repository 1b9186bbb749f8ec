//! Postmark batch mailer

use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::mail::{BatchSession, DeliveryReceipt, MailerError, MailerFactory, Message};

/// The public Postmark API
pub const POSTMARK_API_URL: &str = "https://api.postmarkapp.com";

const SERVER_TOKEN_HEADER: &str = "X-Postmark-Server-Token";

/// Postmark's error code for a malformed recipient or sender
const INVALID_EMAIL_REQUEST: i64 = 300;

/// Most messages Postmark accepts in one batch request
pub const MAX_BATCH_SIZE: usize = 500;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiErrorBody {
    error_code: i64,
    message: String,
}

/// Creates [`PostmarkBatch`] sessions sharing one HTTP client
#[derive(Clone, Debug)]
pub struct PostmarkClient {
    http: Client,
    api_url: String,
}

impl PostmarkClient {
    /// Creates a client for the Postmark API at `api_url`
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.into(),
        }
    }
}

impl Default for PostmarkClient {
    fn default() -> Self {
        Self::new(POSTMARK_API_URL)
    }
}

impl MailerFactory for PostmarkClient {
    type Session = PostmarkBatch;

    fn create(&self, api_key: Option<String>) -> PostmarkBatch {
        PostmarkBatch {
            http: self.http.clone(),
            endpoint: format!("{}/email/batch", self.api_url.trim_end_matches('/')),
            api_key,
            messages: Vec::new(),
        }
    }
}

/// A batch of messages sent through Postmark's batch endpoint
#[derive(Clone)]
pub struct PostmarkBatch {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
    messages: Vec<Message>,
}

impl PostmarkBatch {
    /// The pending messages
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    async fn post(&self, messages: &[Message]) -> Result<Vec<DeliveryReceipt>, MailerError> {
        // A missing key is sent empty so Postmark rejects it.
        let token = self.api_key.as_deref().unwrap_or_default();

        let response = self
            .http
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .header(SERVER_TOKEN_HEADER, token)
            .json(messages)
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            let receipts: Vec<DeliveryReceipt> = response.json().await?;

            for receipt in receipts.iter().filter(|receipt| !receipt.is_success()) {
                warn!(
                    to = receipt.to.as_deref().unwrap_or_default(),
                    error_code = receipt.error_code,
                    message = %receipt.message,
                    "postmark rejected message"
                );
            }

            return Ok(receipts);
        }

        match status {
            StatusCode::UNAUTHORIZED => Err(MailerError::Unauthorized),
            StatusCode::UNPROCESSABLE_ENTITY => {
                let body: ApiErrorBody = response.json().await?;

                if body.error_code == INVALID_EMAIL_REQUEST {
                    Err(MailerError::InvalidEmail)
                } else {
                    Err(MailerError::Rejected {
                        code: body.error_code,
                        message: body.message,
                    })
                }
            }
            _ => {
                warn!(%status, "postmark batch failed");

                Err(MailerError::SendError)
            }
        }
    }
}

impl std::fmt::Debug for PostmarkBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostmarkBatch")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("messages", &self.messages.len())
            .finish()
    }
}

#[async_trait]
impl BatchSession for PostmarkBatch {
    fn set_messages(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    /// Sends the pending messages in requests of at most [`MAX_BATCH_SIZE`].
    ///
    /// Requests go out in order and the first failure stops the send; messages in
    /// earlier requests have already been accepted by then. An empty batch is still
    /// posted once.
    async fn send(&self) -> Result<Vec<DeliveryReceipt>, MailerError> {
        if self.messages.is_empty() {
            return self.post(&[]).await;
        }

        let mut receipts = Vec::with_capacity(self.messages.len());

        for chunk in self.messages.chunks(MAX_BATCH_SIZE) {
            receipts.extend(self.post(chunk).await?);
        }

        debug!(
            messages = self.messages.len(),
            requests = self.messages.len().div_ceil(MAX_BATCH_SIZE),
            "postmark batch sent"
        );

        Ok(receipts)
    }
}
