//! Point cloud construction and feature estimation for LastFit.
//!
//! Registration works on point clouds derived from the input meshes. This
//! crate provides the three passes that build them:
//!
//! - [`sample_surface`] / [`voxel_downsample`] - uniform area-weighted
//!   surface sampling and regular-grid decimation
//! - [`estimate_normals`] - per-point normals from a hybrid radius/k
//!   neighbourhood plane fit
//! - [`compute_fpfh`] - 33-bin Fast Point Feature Histogram descriptors
//!   used by the coarse RANSAC registration
//!
//! Sampling is deterministic: the generator seed is fixed per call, so a
//! given `(mesh, count)` always produces the same cloud and repeated batch
//! runs are reproducible.
//!
//! # Example
//!
//! ```
//! use fit_types::unit_cube;
//! use fit_cloud::{sample_surface, voxel_downsample, estimate_normals};
//!
//! let cube = unit_cube();
//! let cloud = sample_surface(&cube, 2000);
//! let mut down = voxel_downsample(&cloud, 0.2).unwrap();
//! estimate_normals(&mut down, 0.4);
//! assert!(down.normals.is_some());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod fpfh;
mod normals;
mod sample;

pub use error::{CloudError, CloudResult};
pub use fpfh::{compute_fpfh, FPFH_MAX_NEIGHBORS};
pub use normals::{estimate_normals, NORMAL_MAX_NEIGHBORS};
pub use sample::{sample_surface, voxel_downsample, SAMPLE_SEED};
