//! Core geometry types for LastFit.
//!
//! This crate provides the foundational types shared by the matching
//! pipeline:
//!
//! - [`Vertex`] - A point in 3D space with optional attributes
//! - [`TriMesh`] - An indexed triangle mesh
//! - [`Triangle`] - A concrete triangle with vertex positions
//! - [`Aabb`] - Axis-aligned bounding box
//! - [`PointCloud`] - Points with optional normals and feature descriptors
//!
//! It also owns mesh ingest: [`TriMesh::from_raw`] validates raw vertex and
//! index arrays, and [`sanitize`] removes degenerate and duplicate geometry
//! so that downstream operations can assume a clean mesh.
//!
//! # Units
//!
//! This library is **unit-agnostic**. All coordinates are `f64`. Downstream
//! crates assume millimeters, the unit of the last and blank scans.
//!
//! # Coordinate System
//!
//! Right-handed, with the conventions the matching pipeline relies on:
//! the X axis is the one mirrored for left/right symmetry (the mirror plane
//! is YZ). Face winding is counter-clockwise when viewed from outside, so
//! normals point outward by the right-hand rule.
//!
//! # Example
//!
//! ```
//! use fit_types::{TriMesh, Vertex};
//!
//! let mut mesh = TriMesh::new();
//! mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(0.5, 1.0, 0.0));
//! mesh.faces.push([0, 1, 2]);
//!
//! assert_eq!(mesh.face_count(), 1);
//! assert!(!mesh.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod bounds;
mod cloud;
mod error;
mod mesh;
mod sanitize;
mod triangle;
mod vertex;

pub use bounds::Aabb;
pub use cloud::{FpfhFeature, PointCloud};
pub use error::{MeshError, MeshResult};
pub use mesh::{centered_cube, unit_cube, TriMesh};
pub use sanitize::sanitize;
pub use triangle::Triangle;
pub use vertex::{Vertex, VertexAttributes};

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point3, Vector3};
