//! Error types for remote store calls

use thiserror::Error;

/// Errors that can occur when talking to the remote store
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// The request never produced a response (connection, TLS, timeout)
    #[error("Request failed: {0}")]
    Request(String),

    /// The store answered with a non-success status
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error body returned by the store
        message: String,
    },

    /// The response body did not match the expected shape
    #[error("Response decoding failed: {0}")]
    Decode(String),

    /// The store refused the write (constraint or type violation)
    #[error("Write rejected: {0}")]
    Rejected(String),

    /// The store cannot serve requests right now
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Request(error.to_string())
        }
    }
}
