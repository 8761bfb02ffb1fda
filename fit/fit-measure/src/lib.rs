//! Coarse measurement of meshes for LastFit.
//!
//! Cheap whole-mesh quantities used before and around the expensive
//! matching pipeline:
//!
//! - [`coarse_features`] - volume, surface area, bounding-box extents and
//!   an 8x16 normal orientation histogram per mesh
//! - [`volume_prefilter`] / [`shape_prefilter`] - screening predicates on
//!   those descriptors that skip hopeless candidates before alignment
//! - [`mesh_section`] - triangle/plane intersection segments for planar
//!   cross-section drawings
//!
//! # Example
//!
//! ```
//! use fit_types::unit_cube;
//! use fit_measure::coarse_features;
//!
//! let features = coarse_features(&unit_cube());
//! assert!((features.volume - 1.0).abs() < 1e-10);
//! assert!((features.area - 6.0).abs() < 1e-10);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod descriptor;
mod error;
mod prefilter;
mod section;

pub use descriptor::{coarse_features, CoarseDescriptor, HIST_BINS};
pub use error::{MeasureError, MeasureResult};
pub use prefilter::{shape_prefilter, volume_prefilter, CHI2_THRESHOLD, VOLUME_TOLERANCE};
pub use section::{mesh_section, Segment};
