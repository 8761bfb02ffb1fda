//! A concrete triangle with vertex positions.

use nalgebra::{Point3, Vector3};

use crate::Aabb;

/// A triangle defined by three vertex positions.
///
/// Used by spatial structures and per-face computations that want positions
/// resolved, rather than indices into a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex.
    pub v0: Point3<f64>,
    /// Second vertex.
    pub v1: Point3<f64>,
    /// Third vertex.
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a triangle from three points.
    #[inline]
    #[must_use]
    pub const fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// The (doubled-area) cross product of the two edge vectors.
    #[inline]
    #[must_use]
    pub fn edge_cross(&self) -> Vector3<f64> {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0))
    }

    /// Triangle area.
    #[inline]
    #[must_use]
    pub fn area(&self) -> f64 {
        0.5 * self.edge_cross().norm()
    }

    /// Unit normal by the right-hand rule, or `None` for degenerate triangles.
    #[must_use]
    pub fn normal(&self) -> Option<Vector3<f64>> {
        self.edge_cross().try_normalize(f64::EPSILON)
    }

    /// Triangle centroid.
    #[inline]
    #[must_use]
    pub fn centroid(&self) -> Point3<f64> {
        Point3::from((self.v0.coords + self.v1.coords + self.v2.coords) / 3.0)
    }

    /// Bounding box of the triangle.
    #[must_use]
    pub fn aabb(&self) -> Aabb {
        Aabb::from_points([self.v0, self.v1, self.v2].iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn right_triangle() -> Triangle {
        Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn area_of_right_triangle() {
        assert_relative_eq!(right_triangle().area(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn normal_points_up() {
        let n = right_triangle().normal().unwrap();
        assert_relative_eq!(n.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_has_no_normal() {
        let tri = Triangle::new(Point3::origin(), Point3::origin(), Point3::new(1.0, 0.0, 0.0));
        assert!(tri.normal().is_none());
    }

    #[test]
    fn centroid_is_mean() {
        let c = right_triangle().centroid();
        assert_relative_eq!(c.x, 1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(c.y, 1.0 / 3.0, epsilon = 1e-12);
    }
}
