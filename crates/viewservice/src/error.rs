//! Error types for the view service core.

use thiserror::Error;

/// Result type for view service operations.
pub type Result<T> = std::result::Result<T, ViewServiceError>;

/// Errors raised while setting up a view service.
///
/// Heartbeats and queries never fail; the only failures are configuration
/// values that would make failure detection meaningless.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewServiceError {
    /// The dead threshold must span more than one detector interval.
    #[error("dead_pings must be greater than 1, got {0}")]
    DeadPingsTooLow(u32),

    /// The detector cannot run on a zero period.
    #[error("ping interval must be non-zero")]
    ZeroPingInterval,
}
