//! Error types for registration operations.

use thiserror::Error;

use fit_cloud::CloudError;

/// Result type for registration operations.
pub type RegistrationResult<T> = Result<T, RegistrationError>;

/// Errors that can occur during registration.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Source mesh or cloud has no points.
    #[error("source has no points")]
    EmptySource,

    /// Target mesh or cloud has no points.
    #[error("target has no points")]
    EmptyTarget,

    /// The target cloud needs normals for the point-to-plane cost.
    #[error("target cloud has no normals")]
    MissingNormals,

    /// A cloud needs FPFH descriptors for feature matching.
    #[error("cloud has no FPFH descriptors")]
    MissingFeatures,

    /// No feature correspondences survived matching.
    #[error("no feature correspondences between source and target")]
    NoCorrespondences,

    /// SVD computation failed during transform estimation.
    #[error("SVD failed during transform estimation")]
    SvdFailed,

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A cloud-construction pass failed.
    #[error(transparent)]
    Cloud(#[from] CloudError),
}
