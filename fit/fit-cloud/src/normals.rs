//! Per-point normal estimation.

use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::{Matrix3, Vector3};
use tracing::debug;

use fit_types::PointCloud;

/// Neighbourhood cap for normal estimation (hybrid radius/k search).
pub const NORMAL_MAX_NEIGHBORS: usize = 60;

/// Estimate a unit normal per point by plane fitting.
///
/// For each point, the neighbourhood is every point within `radius`,
/// nearest first, capped at [`NORMAL_MAX_NEIGHBORS`]. The normal is the
/// eigenvector of the smallest eigenvalue of the neighbourhood covariance.
/// Orientations are not propagated consistently; the point-to-plane ICP
/// cost downstream tolerates sign flips.
///
/// Points with fewer than 3 neighbours reuse the previous valid estimate,
/// or `+Z` when none has been produced yet, so every point ends up with a
/// unit normal.
pub fn estimate_normals(cloud: &mut PointCloud, radius: f64) {
    let n = cloud.points.len();
    if n == 0 {
        cloud.normals = Some(Vec::new());
        return;
    }

    let mut tree: KdTree<f64, 3> = KdTree::new();
    for (i, p) in cloud.points.iter().enumerate() {
        tree.add(&[p.x, p.y, p.z], i as u64);
    }

    let radius_sq = radius * radius;
    let mut normals = Vec::with_capacity(n);
    let mut last_valid = Vector3::z();
    let mut undefined = 0usize;

    for p in &cloud.points {
        let mut hits = tree.within_unsorted::<SquaredEuclidean>(&[p.x, p.y, p.z], radius_sq);
        hits.sort_unstable_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(NORMAL_MAX_NEIGHBORS);

        if hits.len() < 3 {
            undefined += 1;
            normals.push(last_valid);
            continue;
        }

        // Covariance of the neighbourhood around its mean.
        let mut mean = Vector3::zeros();
        for hit in &hits {
            #[allow(clippy::cast_possible_truncation)]
            let q = &cloud.points[hit.item as usize];
            mean += q.coords;
        }
        #[allow(clippy::cast_precision_loss)]
        let inv = 1.0 / hits.len() as f64;
        mean *= inv;

        let mut covariance = Matrix3::zeros();
        for hit in &hits {
            #[allow(clippy::cast_possible_truncation)]
            let d = cloud.points[hit.item as usize].coords - mean;
            covariance += d * d.transpose();
        }
        covariance *= inv;

        let eigen = covariance.symmetric_eigen();
        let smallest = eigen.eigenvalues.imin();
        let axis: Vector3<f64> = eigen.eigenvectors.column(smallest).into_owned();

        match axis.try_normalize(f64::EPSILON) {
            Some(normal) => {
                last_valid = normal;
                normals.push(normal);
            }
            None => {
                undefined += 1;
                normals.push(last_valid);
            }
        }
    }

    if undefined > 0 {
        debug!(undefined, total = n, "normals fell back for isolated points");
    }
    cloud.normals = Some(normals);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    fn plane_cloud() -> PointCloud {
        let mut points = Vec::new();
        for i in 0..10 {
            for j in 0..10 {
                points.push(Point3::new(f64::from(i) * 0.1, f64::from(j) * 0.1, 0.0));
            }
        }
        PointCloud::from_points(points)
    }

    #[test]
    fn planar_cloud_normals_are_z() {
        let mut cloud = plane_cloud();
        estimate_normals(&mut cloud, 0.35);
        let normals = cloud.normals.unwrap();
        for normal in &normals {
            assert_relative_eq!(normal.z.abs(), 1.0, epsilon = 1e-8);
        }
    }

    #[test]
    fn normals_are_unit_length() {
        let mut cloud = plane_cloud();
        estimate_normals(&mut cloud, 0.35);
        for normal in cloud.normals.unwrap() {
            assert_relative_eq!(normal.norm(), 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn isolated_points_get_fallback_normal() {
        let mut cloud = PointCloud::from_points(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(100.0, 0.0, 0.0),
        ]);
        estimate_normals(&mut cloud, 0.1);
        let normals = cloud.normals.unwrap();
        assert_eq!(normals.len(), 2);
        assert_relative_eq!(normals[0].z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_cloud_gets_empty_normals() {
        let mut cloud = PointCloud::new();
        estimate_normals(&mut cloud, 1.0);
        assert_eq!(cloud.normals.as_ref().map(Vec::len), Some(0));
    }
}
