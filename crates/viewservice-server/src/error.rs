//! Server error types.

use std::net::SocketAddr;

use thiserror::Error;
use viewservice::ViewServiceError;
use viewservice_wire::WireError;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur during server operations.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Wire protocol error.
    #[error("wire protocol error: {0}")]
    Wire(#[from] WireError),

    /// Invalid view service configuration.
    #[error("invalid service configuration: {0}")]
    Service(#[from] ViewServiceError),

    /// I/O error.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Bind failed.
    #[error("failed to bind to {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// The listener stopped accepting connections. Fatal for the server.
    #[error("accept failed: {0}")]
    AcceptFailed(std::io::Error),
}
