//! Per-vertex clearance field.

use rayon::prelude::*;

use fit_sdf::DistanceScene;
use fit_types::TriMesh;

use crate::ClearanceResult;

/// Clearance of every target vertex against the candidate surface.
///
/// Interior vertices map to their clearance `|sd|`; vertices outside the
/// candidate map to `f64::INFINITY` (there is no wall there to measure).
/// This is the numeric field behind clearance heatmaps; colouring and
/// export are the caller's business.
///
/// # Errors
///
/// Returns an error when the candidate mesh has no faces.
///
/// # Example
///
/// ```
/// use fit_types::centered_cube;
/// use fit_clearance::vertex_clearances;
///
/// let field = vertex_clearances(&centered_cube(1.0), &centered_cube(1.4)).unwrap();
/// assert!(field.iter().all(|c| (c - 0.2).abs() < 1e-9));
/// ```
pub fn vertex_clearances(target: &TriMesh, candidate: &TriMesh) -> ClearanceResult<Vec<f64>> {
    let scene = DistanceScene::new(candidate)?;
    let positions: Vec<_> = target.positions().copied().collect();

    Ok(positions
        .par_iter()
        .map(|p| {
            let sd = scene.signed_distance(p);
            if sd <= 0.0 {
                -sd
            } else {
                f64::INFINITY
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fit_types::centered_cube;
    use nalgebra::Vector3;

    #[test]
    fn interior_vertices_get_clearance() {
        let field = vertex_clearances(&centered_cube(1.0), &centered_cube(1.4)).unwrap();
        assert_eq!(field.len(), 8);
        for c in field {
            assert!((c - 0.2).abs() < 1e-9);
        }
    }

    #[test]
    fn exterior_vertices_get_infinity() {
        let target = centered_cube(1.0);
        let mut candidate = centered_cube(1.0);
        candidate.translate(Vector3::new(10.0, 0.0, 0.0));
        let field = vertex_clearances(&target, &candidate).unwrap();
        assert!(field.iter().all(|c| c.is_infinite()));
    }

    #[test]
    fn field_matches_vertex_order() {
        let target = centered_cube(1.0);
        let mut candidate = centered_cube(1.4);
        candidate.translate(Vector3::new(-0.1, 0.0, 0.0));
        let field = vertex_clearances(&target, &candidate).unwrap();
        for (vertex, clearance) in target.vertices.iter().zip(field.iter()) {
            // +x corners sit 0.1 from the shifted x wall; -x corners are
            // limited by the y/z walls at 0.2.
            let expected = if vertex.position.x > 0.0 { 0.1 } else { 0.2 };
            assert!(
                (clearance - expected).abs() < 1e-9,
                "vertex {vertex:?} clearance {clearance}"
            );
        }
    }
}
