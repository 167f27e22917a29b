//! Error types for the forecast assistant.

use thiserror::Error;

use crate::lifecycle::OutcomeKind;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the forecast backend.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Deadline exceeded before a response arrived
    #[error("Request timed out")]
    Timeout,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// No usable credential
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Backend refused the credential
    #[error("Authorization error: {0}")]
    Unauthorized(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend answered but rejected the request
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        Error::Validation(errors.to_string())
    }
}

impl Error {
    /// Map this error onto the outcome taxonomy seen by the conversation.
    pub fn outcome_kind(&self) -> OutcomeKind {
        match self {
            Error::Http(e) if e.is_timeout() => OutcomeKind::Timeout,
            Error::Timeout => OutcomeKind::Timeout,
            Error::Auth(_) => OutcomeKind::AuthUnavailable,
            Error::Unauthorized(_)
            | Error::NotFound(_)
            | Error::Rejected(_)
            | Error::Validation(_) => OutcomeKind::ServerRejected,
            Error::Http(_) | Error::Serialization(_) | Error::Config(_) | Error::Internal(_) => {
                OutcomeKind::TransportFailure
            }
        }
    }

    /// Build an error from a non-success HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Error::Unauthorized(message),
            404 => Error::NotFound(message),
            _ => Error::Rejected(message),
        }
    }
}
