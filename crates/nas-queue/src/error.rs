//! Queue error types.

use thiserror::Error;

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;

/// Errors produced by the upload queue handle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// The worker has shut down and no longer accepts files.
    #[error("upload queue closed")]
    Closed,
    /// Configuration rejected at construction time.
    #[error("invalid queue configuration")]
    InvalidConfig {
        /// Field that failed validation.
        field: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
    },
}
