//! Kabsch algorithm: optimal rigid transform from paired points.

use nalgebra::{Matrix3, Point3, Rotation3, UnitQuaternion, Vector3};

use crate::{RegistrationError, RegistrationResult, RigidTransform};

/// Computes the rigid transform that best aligns source points to target
/// points in the least-squares sense.
///
/// SVD of the cross-covariance with the usual reflection correction, so the
/// result is always a proper rotation. No scale is estimated; the matching
/// pipeline treats any scale search as a caller-side concern.
///
/// # Errors
///
/// Returns an error if either set is empty, the lengths differ, or the SVD
/// fails on a degenerate configuration.
///
/// # Example
///
/// ```
/// use fit_registration::compute_rigid_transform;
/// use nalgebra::Point3;
///
/// let source = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let target: Vec<_> = source
///     .iter()
///     .map(|p| Point3::new(p.x + 1.0, p.y + 2.0, p.z + 3.0))
///     .collect();
///
/// let transform = compute_rigid_transform(&source, &target).unwrap();
/// let aligned = transform.transform_point(&source[0]);
/// assert!((aligned.coords - target[0].coords).norm() < 1e-9);
/// ```
pub fn compute_rigid_transform(
    source_points: &[Point3<f64>],
    target_points: &[Point3<f64>],
) -> RegistrationResult<RigidTransform> {
    if source_points.is_empty() {
        return Err(RegistrationError::EmptySource);
    }
    if target_points.is_empty() {
        return Err(RegistrationError::EmptyTarget);
    }
    if source_points.len() != target_points.len() {
        return Err(RegistrationError::InvalidParameter(format!(
            "point sets must have equal length: {} vs {}",
            source_points.len(),
            target_points.len()
        )));
    }

    let source_centroid = centroid(source_points);
    let target_centroid = centroid(target_points);

    // Cross-covariance H = sum(source_i * target_i^T), both sets centred.
    let mut h = Matrix3::zeros();
    for (s, t) in source_points.iter().zip(target_points.iter()) {
        let sc = s.coords - source_centroid;
        let tc = t.coords - target_centroid;
        h += sc * tc.transpose();
    }

    let svd = h.svd(true, true);
    let u = svd.u.ok_or(RegistrationError::SvdFailed)?;
    let v_t = svd.v_t.ok_or(RegistrationError::SvdFailed)?;

    let mut rotation_matrix = v_t.transpose() * u.transpose();

    // Reflection case: flip the sign of the last column of V.
    if rotation_matrix.determinant() < 0.0 {
        let mut v = v_t.transpose();
        for i in 0..3 {
            v[(i, 2)] = -v[(i, 2)];
        }
        rotation_matrix = v * u.transpose();
    }

    let rotation =
        UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(rotation_matrix));
    let translation = target_centroid - rotation * source_centroid;

    Ok(RigidTransform::new(rotation, translation))
}

fn centroid(points: &[Point3<f64>]) -> Vector3<f64> {
    #[allow(clippy::cast_precision_loss)]
    let n = points.len() as f64;
    points.iter().map(|p| p.coords).sum::<Vector3<f64>>() / n
}
