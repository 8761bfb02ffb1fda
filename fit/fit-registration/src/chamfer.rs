//! Symmetric Chamfer distance between point clouds.

use kiddo::{KdTree, SquaredEuclidean};

use fit_types::PointCloud;

/// Sentinel returned when either cloud is empty.
pub const CHAMFER_EMPTY: f64 = 1e9;

/// Symmetric mean nearest-neighbour distance between two clouds.
///
/// `mean_{a in A} d(a, B) + mean_{b in B} d(b, A)`, each direction served
/// by a KD-tree over the opposite cloud. Lower is better; the mirror-aware
/// aligner uses this to pick between the original and mirrored pose.
///
/// Returns [`CHAMFER_EMPTY`] when either cloud has no points.
#[must_use]
pub fn chamfer_distance(a: &PointCloud, b: &PointCloud) -> f64 {
    if a.is_empty() || b.is_empty() {
        return CHAMFER_EMPTY;
    }

    directed_mean(a, b) + directed_mean(b, a)
}

/// Mean distance from every point of `from` to its nearest point of `to`.
fn directed_mean(from: &PointCloud, to: &PointCloud) -> f64 {
    let mut tree: KdTree<f64, 3> = KdTree::new();
    for (i, p) in to.points.iter().enumerate() {
        tree.add(&[p.x, p.y, p.z], i as u64);
    }

    let sum: f64 = from
        .points
        .iter()
        .map(|p| {
            tree.nearest_one::<SquaredEuclidean>(&[p.x, p.y, p.z])
                .distance
                .sqrt()
        })
        .sum();

    #[allow(clippy::cast_precision_loss)]
    let n = from.points.len() as f64;
    sum / n
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn identical_clouds_score_zero() {
        let cloud = PointCloud::from_points(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        assert_relative_eq!(chamfer_distance(&cloud, &cloud), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn shifted_cloud_scores_twice_the_shift() {
        let a = PointCloud::from_points(vec![Point3::new(0.0, 0.0, 0.0)]);
        let b = PointCloud::from_points(vec![Point3::new(0.5, 0.0, 0.0)]);
        assert_relative_eq!(chamfer_distance(&a, &b), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn asymmetric_sizes_use_per_direction_means() {
        let a = PointCloud::from_points(vec![Point3::new(0.0, 0.0, 0.0)]);
        let b = PointCloud::from_points(vec![
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
        ]);
        // a -> b: 1.0; b -> a: (1 + 1) / 2 = 1.0
        assert_relative_eq!(chamfer_distance(&a, &b), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_cloud_is_sentinel() {
        let a = PointCloud::new();
        let b = PointCloud::from_points(vec![Point3::origin()]);
        assert_relative_eq!(chamfer_distance(&a, &b), CHAMFER_EMPTY);
    }
}
