//! Clearance analysis between a target last and an aligned candidate blank.
//!
//! Once a candidate is aligned, the question becomes: does it enclose the
//! target with enough wall everywhere? This crate provides two evaluators
//! and the diagnostics around them:
//!
//! - [`clearance_sampling`] - fast screening: uniform target-surface samples
//!   against the candidate's signed distance field
//! - [`clearance_sdf_volume`] - the authoritative narrow-band voxel check,
//!   whose `eps = (sqrt(3)/2) * voxel` bounds the discretisation error of
//!   the reported worst-case clearance
//! - [`min_clearance_point`] - where the wall is thinnest
//! - [`thin_regions`] / [`label_regions`] - clusters of thin vertices with
//!   toe/heel and medial/lateral tags
//! - [`vertex_clearances`] - the per-vertex field behind clearance heatmaps
//!
//! Clearance at a point is the distance from the target surface to the
//! candidate surface, measured only where the point is strictly interior to
//! the candidate. All reported clearances are non-negative.
//!
//! # Example
//!
//! ```
//! use fit_types::centered_cube;
//! use fit_clearance::{clearance_sampling, SamplingParams};
//!
//! let target = centered_cube(1.0);
//! let blank = centered_cube(1.4);
//! let params = SamplingParams::new(0.1, 0.0, 5000);
//! let report = clearance_sampling(&target, &blank, &params).unwrap();
//! assert!(report.pass);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod field;
mod params;
mod regions;
mod report;
mod sampling;
mod thinnest;
mod voxel;

pub use error::{ClearanceError, ClearanceResult};
pub use field::vertex_clearances;
pub use params::{SamplingParams, VoxelParams};
pub use regions::{label_regions, thin_regions};
pub use report::{
    ForeAft, LabeledRegion, RegionLabel, SamplingReport, Side, ThinRegion, ThinnestPoint,
    VoxelReport, VoxelVerdict,
};
pub use sampling::clearance_sampling;
pub use thinnest::min_clearance_point;
pub use voxel::{clearance_sdf_volume, CELL_CAP};
