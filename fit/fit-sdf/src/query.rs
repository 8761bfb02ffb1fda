//! Geometric primitives for distance and occupancy queries.

use nalgebra::Point3;

/// Compute the closest point on a triangle to a query point.
///
/// Voronoi-region walk from "Real-Time Collision Detection" (Ericson).
///
/// # Example
///
/// ```
/// use fit_sdf::closest_point_on_triangle;
/// use nalgebra::Point3;
///
/// let closest = closest_point_on_triangle(
///     &Point3::new(0.3, 0.3, 5.0),
///     &Point3::new(0.0, 0.0, 0.0),
///     &Point3::new(1.0, 0.0, 0.0),
///     &Point3::new(0.0, 1.0, 0.0),
/// );
/// assert!((closest.z - 0.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn closest_point_on_triangle(
    point: &Point3<f64>,
    v0: &Point3<f64>,
    v1: &Point3<f64>,
    v2: &Point3<f64>,
) -> Point3<f64> {
    let ab = v1 - v0;
    let ac = v2 - v0;
    let ap = point - v0;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);

    // Vertex region outside A
    if d1 <= 0.0 && d2 <= 0.0 {
        return *v0;
    }

    let bp = point - v1;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);

    // Vertex region outside B
    if d3 >= 0.0 && d4 <= d3 {
        return *v1;
    }

    // Edge region AB
    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return v0 + ab * v;
    }

    let cp = point - v2;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);

    // Vertex region outside C
    if d6 >= 0.0 && d5 <= d6 {
        return *v2;
    }

    // Edge region AC
    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return v0 + ac * w;
    }

    // Edge region BC
    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return v1 + (v2 - v1) * w;
    }

    // Face region
    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    v0 + ab * v + ac * w
}

/// Solid angle subtended by a triangle at a query point.
///
/// Van Oosterom-Strackee formula. Summing over every face of a closed,
/// outward-wound mesh gives `4π` for interior points and `0` for exterior
/// ones; dividing by `4π` yields the generalized winding number.
#[must_use]
pub fn triangle_solid_angle(
    point: &Point3<f64>,
    v0: &Point3<f64>,
    v1: &Point3<f64>,
    v2: &Point3<f64>,
) -> f64 {
    let a = v0 - point;
    let b = v1 - point;
    let c = v2 - point;

    let la = a.norm();
    let lb = b.norm();
    let lc = c.norm();

    let numerator = a.dot(&b.cross(&c));
    let denominator =
        la * lb * lc + a.dot(&b) * lc + b.dot(&c) * la + c.dot(&a) * lb;

    2.0 * numerator.atan2(denominator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn tri() -> (Point3<f64>, Point3<f64>, Point3<f64>) {
        (
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(5.0, 10.0, 0.0),
        )
    }

    #[test]
    fn closest_point_above_face() {
        let (a, b, c) = tri();
        let closest = closest_point_on_triangle(&Point3::new(5.0, 3.0, 7.0), &a, &b, &c);
        assert_relative_eq!(closest.x, 5.0, epsilon = 1e-12);
        assert_relative_eq!(closest.y, 3.0, epsilon = 1e-12);
        assert_relative_eq!(closest.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn closest_point_snaps_to_vertex() {
        let (a, b, c) = tri();
        let closest = closest_point_on_triangle(&Point3::new(-5.0, -5.0, 0.0), &a, &b, &c);
        assert_relative_eq!(closest.coords, a.coords, epsilon = 1e-12);
    }

    #[test]
    fn closest_point_snaps_to_edge() {
        let (a, b, c) = tri();
        let closest = closest_point_on_triangle(&Point3::new(5.0, -2.0, 0.0), &a, &b, &c);
        assert_relative_eq!(closest.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(closest.x, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn solid_angle_of_octant() {
        // The triangle of the three axis unit points seen from the origin
        // covers one octant of the sphere: 4π/8.
        let p = Point3::origin();
        let angle = triangle_solid_angle(
            &p,
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, 1.0, 0.0),
            &Point3::new(0.0, 0.0, 1.0),
        );
        assert_relative_eq!(angle.abs(), PI / 2.0, epsilon = 1e-12);
    }
}
