//! RANSAC coarse registration over FPFH feature matches.

use nalgebra::Matrix4;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

use fit_types::PointCloud;

use crate::{compute_rigid_transform, RegistrationError, RegistrationResult};

/// Seed offset for the RANSAC stream, derived from the shared sampling seed
/// so whole-pipeline runs stay reproducible.
const RANSAC_SEED: u64 = fit_cloud::SAMPLE_SEED ^ 0x52414e_53;

/// Parameters for RANSAC feature-based registration.
#[derive(Debug, Clone, Copy)]
pub struct RansacParams {
    /// Distance gate for the correspondence checker and inlier counting,
    /// conventionally `3 * voxel`.
    pub distance_threshold: f64,
    /// Correspondences drawn per hypothesis.
    pub sample_size: usize,
    /// Iteration cap.
    pub max_iterations: u32,
    /// Validation cap: hypotheses that pass the checker before stopping.
    pub max_validations: u32,
    /// Keep at most this many feature matches, best first.
    pub max_correspondences: usize,
}

impl Default for RansacParams {
    fn default() -> Self {
        Self {
            distance_threshold: 1.0,
            sample_size: 4,
            max_iterations: 8000,
            max_validations: 1000,
            max_correspondences: 1000,
        }
    }
}

impl RansacParams {
    /// Parameters with the conventional `3 * voxel` gate.
    #[must_use]
    pub fn for_voxel(voxel: f64) -> Self {
        Self {
            distance_threshold: 3.0 * voxel,
            ..Self::default()
        }
    }
}

/// Coarse registration by RANSAC over nearest-FPFH correspondences.
///
/// Every source point is matched to the target point with the closest FPFH
/// descriptor; the best [`RansacParams::max_correspondences`] matches form
/// the hypothesis pool. Each iteration draws `sample_size` distinct matches,
/// estimates a rigid transform by SVD, and discards the hypothesis unless
/// all drawn pairs land within the distance gate under it; surviving
/// hypotheses are scored by their inlier count over the whole pool.
/// Terminates after `max_iterations` draws or `max_validations` surviving
/// hypotheses, whichever comes first.
///
/// Fails soft: when no hypothesis survives the checker, the identity
/// transform is returned rather than an error, and the fine stage starts
/// from there.
///
/// # Errors
///
/// Returns an error if either cloud is empty, lacks FPFH descriptors, or no
/// feature correspondences can be formed at all.
pub fn ransac_feature_alignment(
    source: &PointCloud,
    target: &PointCloud,
    params: &RansacParams,
) -> RegistrationResult<Matrix4<f64>> {
    if source.is_empty() {
        return Err(RegistrationError::EmptySource);
    }
    if target.is_empty() {
        return Err(RegistrationError::EmptyTarget);
    }
    let source_features = source
        .features
        .as_ref()
        .ok_or(RegistrationError::MissingFeatures)?;
    let target_features = target
        .features
        .as_ref()
        .ok_or(RegistrationError::MissingFeatures)?;
    if target_features.is_empty() {
        return Err(RegistrationError::NoCorrespondences);
    }

    // Nearest-descriptor match per source point (brute force over the 33-d
    // histograms; the clouds are voxel-downsampled before they get here).
    let mut matches: Vec<(usize, usize, f64)> = source_features
        .par_iter()
        .enumerate()
        .map(|(i, feature)| {
            let mut best = (0usize, f64::MAX);
            for (j, candidate) in target_features.iter().enumerate() {
                let d = feature.distance(candidate);
                if d < best.1 {
                    best = (j, d);
                }
            }
            (i, best.0, best.1)
        })
        .collect();

    matches.sort_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal));
    matches.truncate(params.max_correspondences);

    if matches.len() < params.sample_size {
        return Err(RegistrationError::NoCorrespondences);
    }

    let gate_sq = params.distance_threshold * params.distance_threshold;
    let mut rng = StdRng::seed_from_u64(RANSAC_SEED);
    let mut best_inliers = 0usize;
    let mut best_transform: Option<Matrix4<f64>> = None;
    let mut validations = 0u32;

    for _ in 0..params.max_iterations {
        if validations >= params.max_validations {
            break;
        }

        let sample = draw_distinct(&mut rng, params.sample_size, matches.len());
        let (src_pts, tgt_pts): (Vec<_>, Vec<_>) = sample
            .iter()
            .map(|&k| {
                let (i, j, _) = matches[k];
                (source.points[i], target.points[j])
            })
            .unzip();

        let Ok(hypothesis) = compute_rigid_transform(&src_pts, &tgt_pts) else {
            continue;
        };
        let transform = hypothesis.to_matrix4();

        // Correspondence checker: every drawn pair must survive the gate.
        let checked = src_pts
            .iter()
            .zip(tgt_pts.iter())
            .all(|(s, t)| (transform.transform_point(s) - t).norm_squared() <= gate_sq);
        if !checked {
            continue;
        }
        validations += 1;

        let inliers = matches
            .iter()
            .filter(|&&(i, j, _)| {
                (transform.transform_point(&source.points[i]) - target.points[j]).norm_squared()
                    <= gate_sq
            })
            .count();

        if inliers > best_inliers {
            best_inliers = inliers;
            best_transform = Some(transform);
        }
    }

    let Some(transform) = best_transform else {
        debug!("RANSAC found no valid hypothesis, returning identity");
        return Ok(Matrix4::identity());
    };

    // Polish with every inlier of the winning hypothesis.
    let (src_pts, tgt_pts): (Vec<_>, Vec<_>) = matches
        .iter()
        .filter(|&&(i, j, _)| {
            (transform.transform_point(&source.points[i]) - target.points[j]).norm_squared()
                <= gate_sq
        })
        .map(|&(i, j, _)| (source.points[i], target.points[j]))
        .unzip();

    let polished = compute_rigid_transform(&src_pts, &tgt_pts)
        .map_or(transform, |t| t.to_matrix4());

    debug!(
        inliers = best_inliers,
        pool = matches.len(),
        validations,
        "RANSAC coarse registration finished"
    );
    Ok(polished)
}

/// Draw `count` distinct indices in `[0, max)`.
fn draw_distinct(rng: &mut StdRng, count: usize, max: usize) -> Vec<usize> {
    let mut drawn = Vec::with_capacity(count);
    while drawn.len() < count {
        let index = rng.gen_range(0..max);
        if !drawn.contains(&index) {
            drawn.push(index);
        }
    }
    drawn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform_cloud;
    use approx::assert_relative_eq;
    use fit_cloud::{compute_fpfh, estimate_normals, sample_surface};
    use fit_types::unit_cube;
    use nalgebra::Vector3;

    fn featured_cloud() -> PointCloud {
        let mut cloud = sample_surface(&unit_cube(), 300);
        estimate_normals(&mut cloud, 0.3);
        compute_fpfh(&mut cloud, 0.3).unwrap();
        cloud
    }

    #[test]
    fn recovers_translation() {
        let target = featured_cloud();
        let shift = Matrix4::new_translation(&Vector3::new(4.0, 2.0, 1.0));
        let source = transform_cloud(&target, &shift.try_inverse().unwrap());

        let params = RansacParams::for_voxel(0.1);
        let transform = ransac_feature_alignment(&source, &target, &params).unwrap();

        // The transform should bring most source points near their targets.
        let mut close = 0;
        for (s, t) in source.points.iter().zip(target.points.iter()) {
            if (transform.transform_point(s) - t).norm() < 0.3 {
                close += 1;
            }
        }
        assert!(
            close > source.points.len() / 2,
            "only {close} of {} points aligned",
            source.points.len()
        );
    }

    #[test]
    fn missing_features_is_error() {
        let cloud = PointCloud::from_points(vec![nalgebra::Point3::origin()]);
        assert!(matches!(
            ransac_feature_alignment(&cloud, &cloud, &RansacParams::default()),
            Err(RegistrationError::MissingFeatures)
        ));
    }

    #[test]
    fn fails_soft_to_identity() {
        // Two far-apart single-cluster clouds with a gate too tight for any
        // 4-sample hypothesis to survive the checker.
        let target = featured_cloud();
        let mut source = featured_cloud();
        for (k, p) in source.points.iter_mut().enumerate() {
            // Scramble so no rigid transform fits the matches.
            p.x += f64::from(u32::try_from(k % 7).unwrap_or(0)) * 13.0;
        }
        let params = RansacParams {
            distance_threshold: 1e-9,
            ..RansacParams::default()
        };
        let transform = ransac_feature_alignment(&source, &target, &params).unwrap();
        assert_relative_eq!(transform, Matrix4::identity(), epsilon = 1e-12);
    }

    #[test]
    fn deterministic() {
        let target = featured_cloud();
        let shift = Matrix4::new_translation(&Vector3::new(1.0, 0.0, 0.0));
        let source = transform_cloud(&target, &shift.try_inverse().unwrap());
        let params = RansacParams::for_voxel(0.1);
        let a = ransac_feature_alignment(&source, &target, &params).unwrap();
        let b = ransac_feature_alignment(&source, &target, &params).unwrap();
        assert_eq!(a, b);
    }
}
