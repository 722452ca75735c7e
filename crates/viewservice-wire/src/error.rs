//! Wire protocol errors.

use thiserror::Error;

/// Result type for wire operations.
pub type WireResult<T> = Result<T, WireError>;

/// Errors that can occur while framing or decoding messages.
#[derive(Debug, Error)]
pub enum WireError {
    /// The frame did not start with the protocol magic.
    #[error("invalid frame magic: {0:02x?}")]
    InvalidMagic([u8; 4]),

    /// The peer speaks a different protocol version.
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u16),

    /// The declared payload exceeds [`MAX_FRAME_SIZE`](crate::MAX_FRAME_SIZE).
    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// The payload could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] postcard::Error),
}
