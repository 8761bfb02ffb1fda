//! Signed-distance oracle for triangle meshes.
//!
//! [`DistanceScene`] is the acceleration structure behind every clearance
//! query in LastFit: build it once per mesh, then ask for closest surface
//! points, unsigned and signed distances, and inside/outside occupancy.
//!
//! # Sign Convention
//!
//! Signed distance is **negative strictly inside** the closed surface,
//! positive strictly outside, and zero on the surface up to floating
//! precision. Inside/outside is decided by the generalized winding number
//! (solid-angle sum), which stays well behaved on the slightly leaky scan
//! meshes this pipeline sees, where ray-parity tests misclassify near
//! holes.
//!
//! # Example
//!
//! ```
//! use fit_types::centered_cube;
//! use fit_sdf::DistanceScene;
//! use nalgebra::Point3;
//!
//! let scene = DistanceScene::new(&centered_cube(2.0)).unwrap();
//! assert!(scene.signed_distance(&Point3::origin()) < 0.0);
//! assert!(scene.signed_distance(&Point3::new(5.0, 0.0, 0.0)) > 0.0);
//! assert!(scene.is_inside(&Point3::origin()));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod bvh;
mod error;
mod query;
mod scene;

pub use error::{SdfError, SdfResult};
pub use query::{closest_point_on_triangle, triangle_solid_angle};
pub use scene::{ClosestHit, DistanceScene};
