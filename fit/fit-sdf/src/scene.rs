//! Distance scene: the per-mesh acceleration structure.

use nalgebra::Point3;

use fit_types::{TriMesh, Triangle};

use crate::bvh::BvhNode;
use crate::query::triangle_solid_angle;
use crate::{SdfError, SdfResult};

/// Result of a closest-point query.
#[derive(Debug, Clone, Copy)]
pub struct ClosestHit {
    /// Closest point on the mesh surface.
    pub point: Point3<f64>,
    /// Index of the triangle carrying the closest point.
    pub face: usize,
    /// Euclidean distance to the closest point.
    pub distance: f64,
}

/// Immutable distance oracle over a triangle mesh.
///
/// Built once per mesh; queries are read-only and safe to issue from
/// parallel workers. Closest-point and distance queries run in `O(log M)`
/// through a BVH; inside/outside runs in `O(M)` via the exact solid-angle
/// winding number.
///
/// # Example
///
/// ```
/// use fit_types::centered_cube;
/// use fit_sdf::DistanceScene;
/// use nalgebra::Point3;
///
/// let scene = DistanceScene::new(&centered_cube(2.0)).unwrap();
/// let hit = scene.closest_point(&Point3::new(0.5, 0.0, 0.0));
/// assert!((hit.distance - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug)]
pub struct DistanceScene {
    triangles: Vec<Triangle>,
    bvh: BvhNode,
}

impl DistanceScene {
    /// Build a scene over a mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh has no faces.
    pub fn new(mesh: &TriMesh) -> SdfResult<Self> {
        let triangles: Vec<Triangle> = mesh.triangles().collect();
        let mut indices: Vec<usize> = (0..triangles.len()).collect();
        let bvh = BvhNode::build(&triangles, &mut indices).ok_or(SdfError::EmptyMesh)?;
        Ok(Self { triangles, bvh })
    }

    /// Number of triangles in the scene.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.triangles.len()
    }

    /// Closest point on the surface to a query point.
    #[must_use]
    pub fn closest_point(&self, point: &Point3<f64>) -> ClosestHit {
        let mut best = (f64::MAX, *point, usize::MAX);
        self.bvh.closest(point, &self.triangles, &mut best);
        ClosestHit {
            point: best.1,
            face: best.2,
            distance: best.0.sqrt(),
        }
    }

    /// Unsigned distance to the surface.
    #[must_use]
    pub fn unsigned_distance(&self, point: &Point3<f64>) -> f64 {
        self.closest_point(point).distance
    }

    /// Generalized winding number of the surface around a point.
    ///
    /// Approximately 1 inside a closed outward-wound surface, 0 outside,
    /// fractional near holes.
    #[must_use]
    pub fn winding_number(&self, point: &Point3<f64>) -> f64 {
        let total: f64 = self
            .triangles
            .iter()
            .map(|t| triangle_solid_angle(point, &t.v0, &t.v1, &t.v2))
            .sum();
        total / (4.0 * std::f64::consts::PI)
    }

    /// Whether the point lies strictly inside the surface.
    #[must_use]
    pub fn is_inside(&self, point: &Point3<f64>) -> bool {
        self.winding_number(point) >= 0.5
    }

    /// Signed distance to the surface: negative inside, positive outside.
    #[must_use]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        let distance = self.unsigned_distance(point);
        if self.is_inside(point) {
            -distance
        } else {
            distance
        }
    }

    /// Signed distance and closest hit in one query.
    #[must_use]
    pub fn signed_closest(&self, point: &Point3<f64>) -> (f64, ClosestHit) {
        let hit = self.closest_point(point);
        let sd = if self.is_inside(point) {
            -hit.distance
        } else {
            hit.distance
        };
        (sd, hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use fit_types::{centered_cube, TriMesh};

    #[test]
    fn empty_mesh_is_rejected() {
        assert!(matches!(
            DistanceScene::new(&TriMesh::new()),
            Err(SdfError::EmptyMesh)
        ));
    }

    #[test]
    fn sign_convention_on_cube() {
        let scene = DistanceScene::new(&centered_cube(2.0)).unwrap();
        assert_relative_eq!(
            scene.signed_distance(&Point3::origin()),
            -1.0,
            epsilon = 1e-10
        );
        assert_relative_eq!(
            scene.signed_distance(&Point3::new(2.0, 0.0, 0.0)),
            1.0,
            epsilon = 1e-10
        );
    }

    #[test]
    fn occupancy_on_cube() {
        let scene = DistanceScene::new(&centered_cube(2.0)).unwrap();
        assert!(scene.is_inside(&Point3::new(0.9, 0.9, 0.9)));
        assert!(!scene.is_inside(&Point3::new(1.1, 0.0, 0.0)));
    }

    #[test]
    fn winding_number_values() {
        let scene = DistanceScene::new(&centered_cube(2.0)).unwrap();
        assert_relative_eq!(scene.winding_number(&Point3::origin()), 1.0, epsilon = 1e-9);
        assert_relative_eq!(
            scene.winding_number(&Point3::new(5.0, 5.0, 5.0)),
            0.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn inside_out_cube_flips_sign() {
        let mut cube = centered_cube(2.0);
        cube.flip_faces();
        let scene = DistanceScene::new(&cube).unwrap();
        // Winding is -1 inside an inverted mesh, which reads as outside.
        assert!(!scene.is_inside(&Point3::origin()));
    }

    #[test]
    fn closest_hit_reports_face_point() {
        let scene = DistanceScene::new(&centered_cube(2.0)).unwrap();
        let hit = scene.closest_point(&Point3::new(0.2, 0.1, 0.6));
        // Nearest face is the top (z = 1).
        assert_relative_eq!(hit.point.z, 1.0, epsilon = 1e-12);
        assert_relative_eq!(hit.distance, 0.4, epsilon = 1e-12);
        assert!(hit.face < scene.face_count());
    }

    #[test]
    fn signed_closest_is_consistent() {
        let scene = DistanceScene::new(&centered_cube(2.0)).unwrap();
        let p = Point3::new(0.3, -0.2, 0.0);
        let (sd, hit) = scene.signed_closest(&p);
        assert_relative_eq!(sd.abs(), hit.distance, epsilon = 1e-15);
        assert!(sd < 0.0);
    }
}
