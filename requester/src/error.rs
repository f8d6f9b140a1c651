//! Requester error types

use thiserror::Error;

use crate::transport::TransportError;

/// Result type alias for requester operations
pub type RequesterResult<T> = Result<T, RequesterError>;

/// Errors that can occur while building, sending, or decoding a request.
///
/// Semantic rejections from the API are *not* errors: they come back as a
/// [`crate::Response`] with `valid == false`.
#[derive(Error, Debug)]
pub enum RequesterError {
    /// A required credential or setting is missing or malformed
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Operation name was empty
    #[error("Operation name must not be empty")]
    InvalidOperation,

    /// Every attempt failed to connect
    #[error("Could not connect after {attempts} attempt(s): {last}")]
    Connectivity { attempts: u32, last: String },

    /// Non-connection HTTP failure (not retried)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body was not well-formed XML
    #[error("Failed to decode response XML: {0}")]
    Decode(String),
}

impl RequesterError {
    /// Whether the failure was a connection failure that exhausted all retries.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity { .. })
    }
}

impl From<TransportError> for RequesterError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Connect(msg) => Self::Connectivity {
                attempts: 1,
                last: msg,
            },
            TransportError::Http(msg) => Self::Transport(msg),
        }
    }
}
