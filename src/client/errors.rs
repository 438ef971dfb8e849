//! # Remote Error Types
//!
//! Failures surfaced by the management endpoint adapters. These are the
//! "unexpected faults" of the lifecycle: every polling and query boundary
//! converts them into a failed result instead of propagating them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteError {
    #[error("Communication with management endpoint failed: {message}")]
    Communication { message: String },

    #[error("{kind} not found: {name}")]
    NotFound { kind: String, name: String },

    #[error("Unknown operation handle: {handle_id}")]
    UnknownHandle { handle_id: String },
}

impl RemoteError {
    /// Create a communication error
    pub fn communication(message: impl Into<String>) -> Self {
        Self::Communication {
            message: message.into(),
        }
    }

    /// Create a not-found error for an inventory object
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create an unknown-handle error
    pub fn unknown_handle(handle_id: impl Into<String>) -> Self {
        Self::UnknownHandle {
            handle_id: handle_id.into(),
        }
    }
}

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RemoteError::not_found("Host", "esx-b");
        assert_eq!(err.to_string(), "Host not found: esx-b");

        let err = RemoteError::unknown_handle("op-7");
        assert_eq!(err.to_string(), "Unknown operation handle: op-7");
    }
}
