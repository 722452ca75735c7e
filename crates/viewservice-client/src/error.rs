//! Client error types.

use std::time::Duration;

use thiserror::Error;
use viewservice_wire::{ErrorCode, WireError};

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur during client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection or I/O error.
    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),

    /// Wire protocol error.
    #[error("wire protocol error: {0}")]
    Wire(#[from] WireError),

    /// The server closed the connection before answering.
    #[error("connection closed by server")]
    ConnectionClosed,

    /// No response within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The server rejected the request at the protocol level.
    #[error("server error ({code:?}): {message}")]
    Server { code: ErrorCode, message: String },

    /// The response does not answer the request that was sent.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}
