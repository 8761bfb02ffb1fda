//! Error types for clearance analysis.

use thiserror::Error;

use fit_sdf::SdfError;

/// Result type for clearance operations.
pub type ClearanceResult<T> = Result<T, ClearanceError>;

/// Errors that can occur during clearance analysis.
#[derive(Debug, Error)]
pub enum ClearanceError {
    /// A parameter is outside its documented domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The voxel grid would exceed the allocation cap.
    #[error("voxel grid of {cells} cells exceeds cap of {cap}; increase voxel or shrink band")]
    GridTooLarge {
        /// Requested cell count.
        cells: u128,
        /// Maximum allowed cell count.
        cap: usize,
    },

    /// Distance-scene construction failed (an input mesh has no faces).
    #[error(transparent)]
    Sdf(#[from] SdfError),
}
