//! Error types for mesh ingest and validation.

use thiserror::Error;

/// Result type for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Errors that can occur while ingesting mesh data.
#[derive(Debug, Error)]
pub enum MeshError {
    /// Raw position array length is not a multiple of 3.
    #[error("positions must be a flat (N, 3) array, got length {len}")]
    BadPositionShape {
        /// Actual array length.
        len: usize,
    },

    /// Raw index array length is not a multiple of 3.
    #[error("indices must be a flat (M, 3) array, got length {len}")]
    BadIndexShape {
        /// Actual array length.
        len: usize,
    },

    /// A face references a vertex that does not exist.
    #[error("face index {index} out of range for mesh with {vertex_count} vertices")]
    IndexOutOfRange {
        /// The offending vertex index.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// Mesh is empty where geometry is required.
    #[error("mesh is empty: {context}")]
    EmptyMesh {
        /// What the caller was trying to do.
        context: &'static str,
    },
}
