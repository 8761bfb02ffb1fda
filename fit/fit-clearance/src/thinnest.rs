//! Thinnest-point locator.

use rayon::prelude::*;
use tracing::debug;

use fit_sdf::DistanceScene;
use fit_types::TriMesh;

use crate::{ClearanceResult, ThinnestPoint};

/// Locate the target vertex with the smallest clearance to the candidate.
///
/// Every target vertex is classified against the candidate's signed
/// distance field; over the interior vertices, the one with the smallest
/// `|sd|` is returned together with its closest point on the candidate
/// surface. `None` means no target vertex lies inside the candidate at all.
///
/// # Errors
///
/// Returns an error when the candidate mesh has no faces.
///
/// # Example
///
/// ```
/// use fit_types::centered_cube;
/// use fit_clearance::min_clearance_point;
///
/// let thinnest = min_clearance_point(&centered_cube(1.0), &centered_cube(1.4))
///     .unwrap()
///     .unwrap();
/// assert!((thinnest.min_clearance - 0.2).abs() < 1e-9);
/// ```
pub fn min_clearance_point(
    target: &TriMesh,
    candidate: &TriMesh,
) -> ClearanceResult<Option<ThinnestPoint>> {
    let scene = DistanceScene::new(candidate)?;

    let per_vertex: Vec<(f64, nalgebra::Point3<f64>)> = target
        .positions()
        .collect::<Vec<_>>()
        .par_iter()
        .map(|p| {
            let (sd, hit) = scene.signed_closest(p);
            (sd, hit.point)
        })
        .collect();

    // Sequential argmin keeps ties deterministic (first wins).
    let mut best: Option<ThinnestPoint> = None;
    for (index, &(sd, closest)) in per_vertex.iter().enumerate() {
        if sd > 0.0 {
            continue;
        }
        let clearance = -sd;
        if best.as_ref().map_or(true, |b| clearance < b.min_clearance) {
            best = Some(ThinnestPoint {
                min_clearance: clearance,
                p_target: target.vertices[index].position,
                p_candidate: closest,
                index,
            });
        }
    }

    debug!(found = best.is_some(), "thinnest-point search finished");
    Ok(best)
}
