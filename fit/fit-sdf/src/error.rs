//! Error types for distance-scene construction.

use thiserror::Error;

/// Result type for SDF operations.
pub type SdfResult<T> = Result<T, SdfError>;

/// Errors that can occur while building a distance scene.
#[derive(Debug, Error)]
pub enum SdfError {
    /// The mesh has no faces; distance queries need a surface.
    #[error("mesh has no faces")]
    EmptyMesh,
}
