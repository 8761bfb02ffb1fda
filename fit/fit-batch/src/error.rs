//! Error types for the batch drivers.

use thiserror::Error;

/// Result type for batch operations.
pub type BatchResult<T> = Result<T, BatchError>;

/// Errors that abort a whole batch call.
///
/// Per-candidate failures never surface here; they are captured into the
/// candidate's own output slot.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The worker pool could not be built.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),

    /// A driver-level parameter is outside its documented domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
