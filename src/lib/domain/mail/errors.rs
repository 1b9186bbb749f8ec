//! Mail errors

use thiserror::Error;

/// Errors raised while delivering a batch of messages
#[derive(Debug, Error)]
pub enum MailerError {
    /// An error occurred while sending the email
    #[error("An error occurred while sending the email")]
    SendError,

    /// Invalid email address
    #[error("Invalid email address")]
    InvalidEmail,

    /// The API key was missing or rejected
    #[error("The mail server rejected the API key")]
    Unauthorized,

    /// The mail server refused the request
    #[error("The mail server rejected the request ({code}): {message}")]
    Rejected {
        /// The provider's error code
        code: i64,

        /// The provider's error message
        message: String,
    },

    /// Unknown error
    #[error(transparent)]
    UnknownError(anyhow::Error),
}

impl From<anyhow::Error> for MailerError {
    fn from(err: anyhow::Error) -> Self {
        MailerError::UnknownError(err)
    }
}

impl From<reqwest::Error> for MailerError {
    fn from(err: reqwest::Error) -> Self {
        MailerError::UnknownError(err.into())
    }
}

/// Errors raised while rendering an email template
#[derive(Debug, Error)]
pub enum RenderError {
    /// No template is registered under the given name
    #[error("template \"{0}\" not found")]
    UnknownTemplate(String),

    /// The template variables do not fit the template
    #[error("invalid template variables: {0}")]
    InvalidVariables(#[from] serde_json::Error),

    /// The template failed to render
    #[error(transparent)]
    Template(#[from] askama::Error),
}

/// Errors raised while composing a message
#[derive(Debug, Error)]
pub enum ComposeError {
    /// An extra field reuses the name of a composed field
    #[error("extra field \"{0}\" collides with a composed field")]
    ReservedField(String),

    /// The template failed to render
    #[error(transparent)]
    Render(#[from] RenderError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_error_message() {
        let err = MailerError::Rejected {
            code: 406,
            message: "Inactive recipient".to_string(),
        };

        assert_eq!(
            err.to_string(),
            "The mail server rejected the request (406): Inactive recipient"
        );
    }

    #[test]
    fn test_unknown_template_error_message() {
        let err = RenderError::UnknownTemplate("welcome".to_string());

        assert_eq!(err.to_string(), "template \"welcome\" not found");
    }

    #[test]
    fn test_render_errors_keep_their_message_when_composing() {
        let err = ComposeError::from(RenderError::UnknownTemplate("welcome".to_string()));

        assert_eq!(err.to_string(), "template \"welcome\" not found");
    }
}
