//! Point-to-plane iterative closest point refinement.

use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::{Matrix3, Matrix4, Matrix6, Point3, Vector3, Vector6};
use tracing::debug;

use fit_types::PointCloud;

use crate::{RegistrationError, RegistrationResult};

/// Parameters for point-to-plane ICP.
#[derive(Debug, Clone, Copy)]
pub struct IcpParams {
    /// Maximum correspondence distance. Pairs farther apart are rejected.
    pub max_correspondence_distance: f64,
    /// Maximum number of iterations.
    pub max_iterations: u32,
    /// Convergence threshold on the RMS residual change between iterations.
    pub convergence_threshold: f64,
}

impl Default for IcpParams {
    fn default() -> Self {
        Self {
            max_correspondence_distance: f64::MAX,
            max_iterations: 50,
            convergence_threshold: 1e-6,
        }
    }
}

impl IcpParams {
    /// Parameters with the given correspondence gate.
    #[must_use]
    pub fn with_max_distance(distance: f64) -> Self {
        Self {
            max_correspondence_distance: distance,
            ..Self::default()
        }
    }
}

/// Result of an ICP refinement.
#[derive(Debug, Clone, Copy)]
pub struct IcpResult {
    /// The refined source-to-target transform.
    pub transform: Matrix4<f64>,
    /// Fraction of source points with a gated correspondence in the final
    /// iteration.
    pub fitness: f64,
    /// RMS point-to-plane residual of the final iteration.
    pub rms_residual: f64,
    /// Iterations performed.
    pub iterations: u32,
    /// Whether the residual change dropped below the threshold.
    pub converged: bool,
}

/// Refines an initial transform by point-to-plane ICP.
///
/// Each iteration transforms the source by the current estimate, gathers
/// nearest-target correspondences within the distance gate, and solves the
/// Gauss-Newton normal equations of the point-to-plane cost
/// `sum(((T s - t) . n)^2)` on the 6-d twist, applying the update through
/// the SE(3) exponential map. Deterministic given the initial transform.
///
/// # Errors
///
/// Returns an error if either cloud is empty, the target has no normals, or
/// no correspondences survive the gate on the first iteration.
pub fn icp_point_to_plane(
    source: &PointCloud,
    target: &PointCloud,
    init: &Matrix4<f64>,
    params: &IcpParams,
) -> RegistrationResult<IcpResult> {
    if source.is_empty() {
        return Err(RegistrationError::EmptySource);
    }
    if target.is_empty() {
        return Err(RegistrationError::EmptyTarget);
    }
    let normals = target
        .normals
        .as_ref()
        .ok_or(RegistrationError::MissingNormals)?;

    let mut tree: KdTree<f64, 3> = KdTree::new();
    for (i, p) in target.points.iter().enumerate() {
        tree.add(&[p.x, p.y, p.z], i as u64);
    }

    let gate_sq =
        params.max_correspondence_distance * params.max_correspondence_distance;

    let mut transform = *init;
    let mut previous_rms = f64::MAX;
    let mut converged = false;
    let mut iterations = 0;
    let mut final_rms = f64::MAX;
    let mut final_fitness = 0.0;

    for iter in 0..params.max_iterations {
        iterations = iter + 1;

        let mut ata = Matrix6::<f64>::zeros();
        let mut atb = Vector6::<f64>::zeros();
        let mut residual_sq = 0.0;
        let mut count = 0usize;

        for src in &source.points {
            let moved = transform.transform_point(src);
            let nearest = tree.nearest_one::<SquaredEuclidean>(&[moved.x, moved.y, moved.z]);
            if nearest.distance > gate_sq {
                continue;
            }

            #[allow(clippy::cast_possible_truncation)]
            let j = nearest.item as usize;
            let t: &Point3<f64> = &target.points[j];
            let n = &normals[j];

            let r = (moved - t).dot(n);
            // Point-to-plane jacobian in the twist (v, w) parameterisation.
            let cross = moved.coords.cross(n);
            let jac = Vector6::new(n.x, n.y, n.z, cross.x, cross.y, cross.z);

            ata += jac * jac.transpose();
            atb += jac * r;
            residual_sq += r * r;
            count += 1;
        }

        if count < 3 {
            if iter == 0 {
                return Err(RegistrationError::NoCorrespondences);
            }
            break;
        }

        #[allow(clippy::cast_precision_loss)]
        let rms = (residual_sq / count as f64).sqrt();
        #[allow(clippy::cast_precision_loss)]
        let fitness = count as f64 / source.points.len() as f64;
        final_rms = rms;
        final_fitness = fitness;

        if let Some(inv) = ata.try_inverse() {
            let delta = -(inv * atb);
            transform = exponential_map_se3(&delta) * transform;
        } else {
            // Degenerate normal equations; no further progress possible.
            break;
        }

        if (previous_rms - rms).abs() < params.convergence_threshold {
            converged = true;
            break;
        }
        previous_rms = rms;
    }

    debug!(
        iterations,
        converged,
        rms = final_rms,
        fitness = final_fitness,
        "point-to-plane ICP finished"
    );

    Ok(IcpResult {
        transform,
        fitness: final_fitness,
        rms_residual: final_rms,
        iterations,
        converged,
    })
}

/// Exponential map from the se(3) twist `(v, w)` to a homogeneous matrix.
fn exponential_map_se3(delta: &Vector6<f64>) -> Matrix4<f64> {
    let v = Vector3::new(delta[0], delta[1], delta[2]);
    let omega = Vector3::new(delta[3], delta[4], delta[5]);
    let theta = omega.norm();

    let (rotation, translation) = if theta < 1e-12 {
        (Matrix3::identity(), v)
    } else {
        let k = omega / theta;
        let k_cross = Matrix3::new(0.0, -k.z, k.y, k.z, 0.0, -k.x, -k.y, k.x, 0.0);
        let k_cross_sq = k_cross * k_cross;

        let rotation =
            Matrix3::identity() + k_cross * theta.sin() + k_cross_sq * (1.0 - theta.cos());
        // Left Jacobian of SO(3) maps the translation part correctly.
        let left_jacobian = Matrix3::identity()
            + k_cross * ((1.0 - theta.cos()) / theta)
            + k_cross_sq * ((theta - theta.sin()) / (theta * theta));
        (rotation, left_jacobian * v)
    };

    let mut transform = Matrix4::identity();
    transform.fixed_view_mut::<3, 3>(0, 0).copy_from(&rotation);
    transform
        .fixed_view_mut::<3, 1>(0, 3)
        .copy_from(&translation);
    transform
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform_cloud;
    use approx::assert_relative_eq;
    use fit_cloud::estimate_normals;
    use nalgebra::{UnitQuaternion, Vector3};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::PI;

    fn random_cloud(count: usize, seed: u64) -> PointCloud {
        let mut rng = StdRng::seed_from_u64(seed);
        let points = (0..count)
            .map(|_| {
                Point3::new(
                    rng.gen_range(0.0..10.0),
                    rng.gen_range(0.0..10.0),
                    rng.gen_range(0.0..2.0),
                )
            })
            .collect();
        PointCloud::from_points(points)
    }

    fn with_normals(mut cloud: PointCloud) -> PointCloud {
        estimate_normals(&mut cloud, 3.0);
        cloud
    }

    #[test]
    fn recovers_small_translation() {
        let target = with_normals(random_cloud(200, 7));
        let shift = Matrix4::new_translation(&Vector3::new(0.3, -0.2, 0.1));
        let source = transform_cloud(&target, &shift.try_inverse().unwrap());

        let result =
            icp_point_to_plane(&source, &target, &Matrix4::identity(), &IcpParams::default())
                .unwrap();

        let recovered = result.transform.transform_point(&source.points[0]);
        assert_relative_eq!(
            recovered.coords,
            target.points[0].coords,
            epsilon = 0.05
        );
        assert!(result.rms_residual < 1e-3);
    }

    #[test]
    fn recovers_small_rotation() {
        let target = with_normals(random_cloud(200, 11));
        let rot = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), PI / 36.0);
        let mut m = Matrix4::identity();
        m.fixed_view_mut::<3, 3>(0, 0)
            .copy_from(rot.to_rotation_matrix().matrix());
        let source = transform_cloud(&target, &m.try_inverse().unwrap());

        let result =
            icp_point_to_plane(&source, &target, &Matrix4::identity(), &IcpParams::default())
                .unwrap();
        assert!(result.rms_residual < 1e-2);
        assert!(result.fitness > 0.9);
    }

    #[test]
    fn deterministic_given_init() {
        let target = with_normals(random_cloud(100, 3));
        let source = random_cloud(100, 4);
        let a = icp_point_to_plane(&source, &target, &Matrix4::identity(), &IcpParams::default())
            .unwrap();
        let b = icp_point_to_plane(&source, &target, &Matrix4::identity(), &IcpParams::default())
            .unwrap();
        assert_eq!(a.transform, b.transform);
        assert_eq!(a.iterations, b.iterations);
    }

    #[test]
    fn missing_normals_is_error() {
        let target = random_cloud(10, 1);
        let source = random_cloud(10, 2);
        assert!(matches!(
            icp_point_to_plane(&source, &target, &Matrix4::identity(), &IcpParams::default()),
            Err(RegistrationError::MissingNormals)
        ));
    }

    #[test]
    fn tight_gate_fails_without_correspondences() {
        let target = with_normals(random_cloud(50, 5));
        let mut source = random_cloud(50, 6);
        for p in &mut source.points {
            p.x += 100.0;
        }
        let params = IcpParams::with_max_distance(0.01);
        assert!(matches!(
            icp_point_to_plane(&source, &target, &Matrix4::identity(), &params),
            Err(RegistrationError::NoCorrespondences)
        ));
    }

    #[test]
    fn exp_map_of_zero_is_identity() {
        let m = exponential_map_se3(&Vector6::zeros());
        assert_relative_eq!(m, Matrix4::identity(), epsilon = 1e-15);
    }
}
