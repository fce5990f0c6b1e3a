//! Error types for the protocol crate.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while validating or interpreting protocol values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A draft or patch failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An enum value could not be parsed.
    #[error("unknown {kind} '{value}'")]
    UnknownVariant {
        /// Which enum was being parsed.
        kind: &'static str,
        /// The rejected input.
        value: String,
    },
}

impl ProtocolError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ProtocolError::validation("title must not be empty");
        assert_eq!(err.to_string(), "validation failed: title must not be empty");

        let err = ProtocolError::UnknownVariant {
            kind: "status",
            value: "done".into(),
        };
        assert_eq!(err.to_string(), "unknown status 'done'");
    }
}
