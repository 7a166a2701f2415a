use thiserror::Error;

use crate::domain::MAX_TAG_LEN;

/// Fallback banner text when the server gives no usable message.
pub const GENERATE_FAILED_MESSAGE: &str = "Failed to generate quote";

/// Rejected tag input. Raised before any network I/O.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("tag required")]
    TagRequired,
    #[error("tag too long ({len} > {MAX_TAG_LEN})")]
    TagTooLong { len: usize },
}

impl ValidationError {
    pub fn user_message(&self) -> String {
        match self {
            ValidationError::TagRequired => "Please select or enter a tag".to_string(),
            ValidationError::TagTooLong { .. } => {
                format!("Tag must be {MAX_TAG_LEN} characters or less")
            }
        }
    }
}

/// A request that did not complete with a usable 2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", describe_transport(*status, message))]
pub struct TransportError {
    pub status: Option<u16>,
    pub message: String,
}

fn describe_transport(status: Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("HTTP {code}: {message}"),
        None => message.to_string(),
    }
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn user_message(&self) -> String {
        if self.message.trim().is_empty() {
            GENERATE_FAILED_MESSAGE.to_string()
        } else {
            self.message.clone()
        }
    }
}

/// Outcome of a failed generation attempt. `Clone` so a single in-flight
/// result can be handed to every caller that joined it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl QuoteError {
    pub fn user_message(&self) -> String {
        match self {
            QuoteError::Validation(err) => err.user_message(),
            QuoteError::Transport(err) => err.user_message(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, QuoteError::Validation(_))
    }
}

/// Durable client state could not be read or written. Never shown to the
/// user; stores log it and fall back to defaults.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read '{key}': {reason}")]
    Read { key: String, reason: String },
    #[error("corrupt value under '{key}': {reason}")]
    Corrupt { key: String, reason: String },
    #[error("failed to write '{key}': {reason}")]
    Write { key: String, reason: String },
}
