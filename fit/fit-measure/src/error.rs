//! Error types for measurement operations.

use thiserror::Error;

/// Result type for measurement operations.
pub type MeasureResult<T> = Result<T, MeasureError>;

/// Errors that can occur during measurement.
#[derive(Debug, Error)]
pub enum MeasureError {
    /// The section plane normal has (near-)zero length.
    #[error("plane normal must have non-zero length")]
    DegeneratePlaneNormal,
}
