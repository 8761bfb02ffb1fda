//! Thin-region clustering and anatomical labelling.

use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::{Matrix3, Point3, Vector3};
use rayon::prelude::*;
use tracing::info;

use fit_sdf::DistanceScene;
use fit_types::TriMesh;

use crate::{
    ClearanceError, ClearanceResult, ForeAft, LabeledRegion, RegionLabel, Side, ThinRegion,
};

/// Cluster thin target vertices into connected regions.
///
/// A target vertex is *thin* when it lies inside the candidate with
/// clearance strictly below `threshold`. Thin vertices are grown into
/// clusters by single-linkage connectivity: a vertex joins a cluster when
/// it is within `radius` of **any** member, repeated to fixpoint, so an
/// elongated thin strip along the last comes back as one region rather
/// than a chain of fragments. The result is a partition of the thin set.
///
/// Per cluster: the minimum clearance, the centroid, and the two extreme
/// member positions along the cluster's dominant PCA axis (a makeshift
/// skeleton for marking the region on drawings).
///
/// # Errors
///
/// Returns an error on out-of-domain parameters or when the candidate mesh
/// has no faces.
pub fn thin_regions(
    target: &TriMesh,
    candidate: &TriMesh,
    threshold: f64,
    radius: f64,
) -> ClearanceResult<Vec<ThinRegion>> {
    if threshold <= 0.0 {
        return Err(ClearanceError::InvalidParameter(format!(
            "threshold must be > 0, got {threshold}"
        )));
    }
    if radius <= 0.0 {
        return Err(ClearanceError::InvalidParameter(format!(
            "radius must be > 0, got {radius}"
        )));
    }

    let scene = DistanceScene::new(candidate)?;
    let positions: Vec<Point3<f64>> = target.positions().copied().collect();

    let signed: Vec<f64> = positions
        .par_iter()
        .map(|p| scene.signed_distance(p))
        .collect();

    // Thin set: interior vertices with clearance strictly below threshold.
    let thin: Vec<usize> = (0..positions.len())
        .filter(|&i| signed[i] <= 0.0 && -signed[i] < threshold)
        .collect();

    if thin.is_empty() {
        info!("no thin vertices below threshold");
        return Ok(Vec::new());
    }

    // KD-tree over the thin vertices only; items are positions in `thin`.
    let mut tree: KdTree<f64, 3> = KdTree::new();
    for (k, &i) in thin.iter().enumerate() {
        let p = &positions[i];
        tree.add(&[p.x, p.y, p.z], k as u64);
    }

    let radius_sq = radius * radius;
    let mut assigned = vec![false; thin.len()];
    let mut regions = Vec::new();

    for seed in 0..thin.len() {
        if assigned[seed] {
            continue;
        }

        // Flood fill to the connectivity fixpoint.
        let mut members: Vec<usize> = Vec::new();
        let mut queue = vec![seed];
        assigned[seed] = true;
        while let Some(k) = queue.pop() {
            members.push(thin[k]);
            let p = &positions[thin[k]];
            for hit in tree.within_unsorted::<SquaredEuclidean>(&[p.x, p.y, p.z], radius_sq) {
                #[allow(clippy::cast_possible_truncation)]
                let j = hit.item as usize;
                if !assigned[j] {
                    assigned[j] = true;
                    queue.push(j);
                }
            }
        }
        members.sort_unstable();

        regions.push(summarise(&members, &positions, &signed));
    }

    info!(
        thin_vertices = thin.len(),
        regions = regions.len(),
        threshold,
        radius,
        "thin-region clustering finished"
    );
    Ok(regions)
}

/// Build the region record for one cluster.
fn summarise(members: &[usize], positions: &[Point3<f64>], signed: &[f64]) -> ThinRegion {
    let min_clearance = members
        .iter()
        .map(|&i| -signed[i])
        .fold(f64::INFINITY, f64::min);

    #[allow(clippy::cast_precision_loss)]
    let inv = 1.0 / members.len() as f64;
    let mean: Vector3<f64> = members.iter().map(|&i| positions[i].coords).sum::<Vector3<f64>>() * inv;
    let centroid = Point3::from(mean);

    // Endpoints: extreme projections onto the dominant covariance axis.
    let axis = dominant_axis(members.iter().map(|&i| positions[i].coords - mean));
    let mut lo = (f64::INFINITY, members[0]);
    let mut hi = (f64::NEG_INFINITY, members[0]);
    for &i in members {
        let t = axis.dot(&(positions[i].coords - mean));
        if t < lo.0 {
            lo = (t, i);
        }
        if t > hi.0 {
            hi = (t, i);
        }
    }

    ThinRegion {
        indices: members.to_vec(),
        min_clearance,
        centroid,
        endpoints: (positions[lo.1], positions[hi.1]),
    }
}

/// Largest-eigenvalue eigenvector of the covariance of centred vectors.
fn dominant_axis(centred: impl Iterator<Item = Vector3<f64>>) -> Vector3<f64> {
    let mut covariance = Matrix3::zeros();
    let mut count = 0usize;
    for d in centred {
        covariance += d * d.transpose();
        count += 1;
    }
    if count == 0 {
        return Vector3::x();
    }
    #[allow(clippy::cast_precision_loss)]
    let eigen = (covariance / count as f64).symmetric_eigen();
    let largest = eigen.eigenvalues.imax();
    eigen.eigenvectors.column(largest).into_owned()
}

/// Principal axes of the whole target vertex set: (mean, length, width).
fn target_axes(target: &TriMesh) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>) {
    #[allow(clippy::cast_precision_loss)]
    let inv = 1.0 / target.vertex_count().max(1) as f64;
    let mean: Vector3<f64> = target.positions().map(|p| p.coords).sum::<Vector3<f64>>() * inv;

    let mut covariance = Matrix3::zeros();
    for p in target.positions() {
        let d = p.coords - mean;
        covariance += d * d.transpose();
    }
    covariance *= inv;

    let eigen = covariance.symmetric_eigen();
    // Sort eigenvalue indices descending: first is the length axis,
    // second the width axis.
    let mut order = [0usize, 1, 2];
    order.sort_unstable_by(|&a, &b| {
        eigen.eigenvalues[b]
            .partial_cmp(&eigen.eigenvalues[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    (
        mean,
        eigen.eigenvectors.column(order[0]).into_owned(),
        eigen.eigenvectors.column(order[1]).into_owned(),
    )
}

/// Attach toe/heel and medial/lateral tags to thin regions.
///
/// The target's leading PCA axis is the length of the last (toe vs heel),
/// the second axis its width (lateral vs medial). Each region is tagged by
/// the sign of its centroid's displacement from the vertex mean along the
/// two axes. Relabelling the same regions is idempotent: the axes depend
/// only on the target.
#[must_use]
pub fn label_regions(target: &TriMesh, regions: Vec<ThinRegion>) -> Vec<LabeledRegion> {
    let (mean, length_axis, width_axis) = target_axes(target);

    regions
        .into_iter()
        .map(|region| {
            let d = region.centroid.coords - mean;
            let label = RegionLabel {
                fore_aft: if length_axis.dot(&d) > 0.0 {
                    ForeAft::Toe
                } else {
                    ForeAft::Heel
                },
                side: if width_axis.dot(&d) > 0.0 {
                    Side::Lateral
                } else {
                    Side::Medial
                },
            };
            LabeledRegion { region, label }
        })
        .collect()
}
