//! Fast Point Feature Histogram descriptors.
//!
//! FPFH is the 33-dimensional descriptor the coarse registration matches
//! on: three 11-bin histograms of the Darboux-frame angles between a point
//! and its neighbours, blended with the neighbours' own histograms weighted
//! by inverse distance.

use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::Vector3;
use rayon::prelude::*;
use tracing::debug;

use fit_types::{FpfhFeature, PointCloud};

use crate::{CloudError, CloudResult};

/// Neighbourhood cap for FPFH estimation (hybrid radius/k search).
pub const FPFH_MAX_NEIGHBORS: usize = 100;

const BINS: usize = 11;

/// Compute FPFH descriptors for every point of the cloud.
///
/// The cloud must already carry normals (see
/// [`estimate_normals`](crate::estimate_normals)). Each point's
/// neighbourhood is every point within `radius`, nearest first, capped at
/// [`FPFH_MAX_NEIGHBORS`].
///
/// # Errors
///
/// Returns an error if `radius` is not strictly positive or the cloud has
/// no normals.
pub fn compute_fpfh(cloud: &mut PointCloud, radius: f64) -> CloudResult<()> {
    if radius <= 0.0 {
        return Err(CloudError::NonPositiveParameter {
            name: "fpfh_radius",
            value: radius,
        });
    }
    let normals = cloud.normals.as_ref().ok_or(CloudError::MissingNormals {
        context: "FPFH needs per-point normals",
    })?;

    let n = cloud.points.len();
    if n == 0 {
        cloud.features = Some(Vec::new());
        return Ok(());
    }

    let mut tree: KdTree<f64, 3> = KdTree::new();
    for (i, p) in cloud.points.iter().enumerate() {
        tree.add(&[p.x, p.y, p.z], i as u64);
    }

    let radius_sq = radius * radius;
    let points = &cloud.points;

    // Neighbour lists (index, distance), nearest first, excluding the point
    // itself.
    let neighborhoods: Vec<Vec<(usize, f64)>> = points
        .par_iter()
        .enumerate()
        .map(|(i, p)| {
            let mut hits = tree.within_unsorted::<SquaredEuclidean>(&[p.x, p.y, p.z], radius_sq);
            hits.sort_unstable_by(|a, b| {
                a.distance
                    .partial_cmp(&b.distance)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            hits.iter()
                .filter_map(|hit| {
                    #[allow(clippy::cast_possible_truncation)]
                    let j = hit.item as usize;
                    (j != i).then(|| (j, hit.distance.sqrt()))
                })
                .take(FPFH_MAX_NEIGHBORS)
                .collect()
        })
        .collect();

    // Pass 1: simplified point feature histograms.
    let spfh: Vec<[f64; 33]> = points
        .par_iter()
        .enumerate()
        .map(|(i, _)| compute_spfh(i, &neighborhoods[i], cloud, normals))
        .collect();

    // Pass 2: blend each histogram with its neighbours', weighted by
    // inverse distance, and renormalise.
    let features: Vec<FpfhFeature> = (0..n)
        .into_par_iter()
        .map(|i| {
            let mut histogram = spfh[i];
            let neighbors = &neighborhoods[i];
            if !neighbors.is_empty() {
                #[allow(clippy::cast_precision_loss)]
                let inv_k = 1.0 / neighbors.len() as f64;
                for &(j, dist) in neighbors {
                    if dist <= f64::EPSILON {
                        continue;
                    }
                    let weight = inv_k / dist;
                    for (bin, s) in histogram.iter_mut().zip(spfh[j].iter()) {
                        *bin += weight * s;
                    }
                }
            }

            let sum: f64 = histogram.iter().sum();
            if sum > 0.0 {
                for bin in &mut histogram {
                    *bin /= sum;
                }
            }
            FpfhFeature { histogram }
        })
        .collect();

    debug!(points = n, radius, "computed FPFH descriptors");
    cloud.features = Some(features);
    Ok(())
}

/// Simplified PFH for one point: Darboux-frame angle histograms against its
/// neighbours.
fn compute_spfh(
    i: usize,
    neighbors: &[(usize, f64)],
    cloud: &PointCloud,
    normals: &[Vector3<f64>],
) -> [f64; 33] {
    let mut histogram = [0.0f64; 33];
    let p = &cloud.points[i];
    let u = normals[i];

    let mut count = 0usize;
    for &(j, dist) in neighbors {
        if dist <= f64::EPSILON {
            continue;
        }
        let diff = (cloud.points[j] - p) / dist;

        // Darboux frame (u, v, w) at the source point.
        let v = match diff.cross(&u).try_normalize(f64::EPSILON) {
            Some(v) => v,
            None => continue, // neighbour direction parallel to the normal
        };
        let w = u.cross(&v);

        let nj = normals[j];
        let alpha = v.dot(&nj);
        let phi = u.dot(&diff);
        let theta = w.dot(&nj).atan2(u.dot(&nj));

        histogram[angle_bin(alpha, -1.0, 1.0)] += 1.0;
        histogram[BINS + angle_bin(phi, -1.0, 1.0)] += 1.0;
        histogram[2 * BINS + angle_bin(theta, -std::f64::consts::PI, std::f64::consts::PI)] += 1.0;
        count += 1;
    }

    if count > 0 {
        #[allow(clippy::cast_precision_loss)]
        let inv = 1.0 / count as f64;
        for bin in &mut histogram {
            *bin *= inv;
        }
    }
    histogram
}

/// Bin a value from `[lo, hi]` into one of [`BINS`] bins, clipping at the
/// top edge.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
// Truncation/sign: the operand is clamped to [0, BINS - 1] first.
fn angle_bin(value: f64, lo: f64, hi: f64) -> usize {
    #[allow(clippy::cast_precision_loss)]
    let scaled = (value - lo) / (hi - lo) * BINS as f64;
    (scaled.clamp(0.0, (BINS - 1) as f64)).floor() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate_normals;
    use crate::sample::sample_surface;
    use approx::assert_relative_eq;
    use fit_types::unit_cube;
    use nalgebra::Point3;

    #[test]
    fn fpfh_requires_normals() {
        let mut cloud = PointCloud::from_points(vec![Point3::origin()]);
        assert!(matches!(
            compute_fpfh(&mut cloud, 1.0),
            Err(CloudError::MissingNormals { .. })
        ));
    }

    #[test]
    fn fpfh_rejects_bad_radius() {
        let mut cloud = PointCloud::new();
        cloud.normals = Some(Vec::new());
        assert!(matches!(
            compute_fpfh(&mut cloud, -1.0),
            Err(CloudError::NonPositiveParameter { .. })
        ));
    }

    #[test]
    fn fpfh_histograms_are_normalised() {
        let mut cloud = sample_surface(&unit_cube(), 400);
        estimate_normals(&mut cloud, 0.3);
        compute_fpfh(&mut cloud, 0.3).unwrap();

        let features = cloud.features.unwrap();
        assert_eq!(features.len(), 400);
        let mut nonzero = 0;
        for f in &features {
            let sum: f64 = f.histogram.iter().sum();
            if sum > 0.0 {
                assert_relative_eq!(sum, 1.0, epsilon = 1e-9);
                nonzero += 1;
            }
        }
        assert!(nonzero > 300, "most descriptors should be populated");
    }

    #[test]
    fn angle_bin_clips_edges() {
        assert_eq!(angle_bin(-2.0, -1.0, 1.0), 0);
        assert_eq!(angle_bin(2.0, -1.0, 1.0), BINS - 1);
        assert_eq!(angle_bin(0.0, -1.0, 1.0), BINS / 2);
    }
}
