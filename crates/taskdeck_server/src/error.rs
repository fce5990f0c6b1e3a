//! Error types for the todo server.

use taskdeck_protocol::{ProtocolError, TodoId};
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the todo server.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServerError {
    /// The request body failed validation.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No todo with this id exists.
    #[error("Todo not found: {0}")]
    NotFound(TodoId),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// HTTP status code this error is reported with.
    pub fn status_code(&self) -> u16 {
        match self {
            ServerError::InvalidRequest(_) => 422,
            ServerError::NotFound(_) => 404,
            ServerError::Internal(_) => 500,
        }
    }

    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

impl From<ProtocolError> for ServerError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Validation(message) => ServerError::InvalidRequest(message),
            other => ServerError::InvalidRequest(other.to_string()),
        }
    }
}
