//! Rigid registration for LastFit.
//!
//! Aligns a candidate blank to a target last in two stages:
//!
//! - **Coarse**: RANSAC over FPFH feature matches
//!   ([`ransac_feature_alignment`]) - no initial guess required
//! - **Fine**: point-to-plane ICP ([`icp_point_to_plane`]) against the
//!   target normals
//!
//! [`align_icp`] composes the two over sampled and downsampled clouds, and
//! [`align_icp_with_mirror`] additionally races the YZ-mirrored source
//! through the same pipeline, keeping whichever pose scores the lower
//! symmetric Chamfer distance. The mirror variant is what lets a left-foot
//! last match a right-foot blank.
//!
//! Transforms are reported as homogeneous `Matrix4<f64>`: a mirrored pose
//! contains a reflection, which a quaternion cannot represent.
//!
//! # Example
//!
//! ```no_run
//! use fit_types::unit_cube;
//! use fit_registration::{align_icp_with_mirror, AlignParams};
//!
//! let target = unit_cube();
//! let candidate = unit_cube();
//! let result = align_icp_with_mirror(&candidate, &target, &AlignParams::default()).unwrap();
//! println!("chamfer {:.3}, mirrored {}", result.chamfer, result.mirrored);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod aligner;
mod chamfer;
mod error;
mod icp;
mod kabsch;
mod ransac;
mod transform;

pub use aligner::{align_icp, align_icp_with_mirror, AlignParams, AlignResult};
pub use chamfer::{chamfer_distance, CHAMFER_EMPTY};
pub use error::{RegistrationError, RegistrationResult};
pub use icp::{icp_point_to_plane, IcpParams, IcpResult};
pub use kabsch::compute_rigid_transform;
pub use ransac::{ransac_feature_alignment, RansacParams};
pub use transform::{mirror_yz, transform_cloud, transform_mesh, RigidTransform};
