//! Error types for point-cloud operations.

use thiserror::Error;

/// Result type for point-cloud operations.
pub type CloudResult<T> = Result<T, CloudError>;

/// Errors that can occur while building or processing point clouds.
#[derive(Debug, Error)]
pub enum CloudError {
    /// A length-like parameter must be strictly positive.
    #[error("{name} must be > 0, got {value}")]
    NonPositiveParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// The cloud has no points where points are required.
    #[error("point cloud is empty: {context}")]
    EmptyCloud {
        /// What the caller was trying to do.
        context: &'static str,
    },

    /// Normals are required but have not been estimated.
    #[error("point cloud has no normals: {context}")]
    MissingNormals {
        /// What the caller was trying to do.
        context: &'static str,
    },
}
