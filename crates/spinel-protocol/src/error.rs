//! Error types for spinel-protocol.

use thiserror::Error;

/// Errors that can occur when encoding or decoding Spinel data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpinelError {
    /// Invalid argument to a constructor.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Decode error at a specific offset.
    #[error("decode error at offset {offset}: {message}")]
    DecodeError {
        /// Byte offset where the error occurred.
        offset: usize,
        /// Description of the error.
        message: String,
    },

    /// Frame payload has no value field.
    #[error("frame payload has no value field")]
    NoValue,

    /// Invalid UTF-8 in a string field.
    #[error("invalid UTF-8 in string field")]
    InvalidUtf8,
}

impl SpinelError {
    /// Create a decode error at a specific offset.
    pub fn decode_at(offset: usize, message: impl Into<String>) -> Self {
        SpinelError::DecodeError {
            offset,
            message: message.into(),
        }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        SpinelError::InvalidArgument(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SpinelError::decode_at(4, "truncated field");
        assert!(err.to_string().contains("offset 4"));

        let err = SpinelError::invalid_argument("tid out of range");
        assert!(err.to_string().contains("tid out of range"));
    }
}
