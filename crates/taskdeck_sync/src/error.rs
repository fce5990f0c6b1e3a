//! Error types for the sync engine.

use taskdeck_protocol::ProtocolError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while talking to a backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    /// The intent was rejected before any call was issued.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Network or transport error, no response was received.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request did not complete in time.
    #[error("request timed out")]
    Timeout,

    /// The backend answered with an error status.
    #[error("backend error ({status}): {message}")]
    Backend {
        /// HTTP-style status code.
        status: u16,
        /// Message reported by the backend.
        message: String,
    },

    /// The backend answered with a body that could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The client configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SyncError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a backend error.
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }

    /// Returns true if the backend reported the record as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::Backend { status: 404, .. })
    }

    /// Returns true if the failure happened after a call was issued, i.e.
    /// it should be recorded in the store's error field.
    pub fn sets_store_error(&self) -> bool {
        !matches!(self, SyncError::Validation(_) | SyncError::InvalidConfig(_))
    }
}

impl From<ProtocolError> for SyncError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Validation(message) => SyncError::Validation(message),
            other => SyncError::Validation(other.to_string()),
        }
    }
}
