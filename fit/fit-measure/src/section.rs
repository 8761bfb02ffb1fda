//! Mesh-plane section.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use fit_types::TriMesh;

use crate::{MeasureError, MeasureResult};

/// One line segment of a planar section.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Segment {
    /// First endpoint.
    pub a: Point3<f64>,
    /// Second endpoint.
    pub b: Point3<f64>,
}

impl Segment {
    /// Segment length.
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.b - self.a).norm()
    }
}

/// Intersect a mesh with a plane, producing unordered line segments.
///
/// Each triangle is classified by the strict signs of its vertices'
/// signed plane values; a triangle with vertices on both strict sides
/// contributes the segment between its two edge crossings
/// `x = p + (d_p / (d_p - d_q)) * (q - p)`. Triangles entirely on one
/// strict side are skipped, and so are coplanar or edge-on-plane triangles
/// (zero plane values produce no crossing; callers section slightly off
/// any flat face they care about).
///
/// # Errors
///
/// Returns an error when the plane normal has zero length.
///
/// # Example
///
/// ```
/// use fit_types::centered_cube;
/// use fit_measure::mesh_section;
/// use nalgebra::{Point3, Vector3};
///
/// let segments = mesh_section(
///     &centered_cube(2.0),
///     &Point3::new(0.0, 0.0, 0.1),
///     &Vector3::z(),
/// )
/// .unwrap();
/// assert!(!segments.is_empty());
/// ```
pub fn mesh_section(
    mesh: &TriMesh,
    plane_point: &Point3<f64>,
    plane_normal: &Vector3<f64>,
) -> MeasureResult<Vec<Segment>> {
    let normal = plane_normal
        .try_normalize(f64::EPSILON)
        .ok_or(MeasureError::DegeneratePlaneNormal)?;

    let mut segments = Vec::with_capacity(mesh.face_count() / 10 + 1);

    for triangle in mesh.triangles() {
        let corners = [triangle.v0, triangle.v1, triangle.v2];
        let values = corners.map(|c| normal.dot(&(c - plane_point)));

        let positive = values.iter().filter(|&&d| d > 0.0).count();
        let negative = values.iter().filter(|&&d| d < 0.0).count();
        if positive == 3 || negative == 3 {
            continue;
        }

        let mut crossings: Vec<Point3<f64>> = Vec::with_capacity(2);
        for (i, j) in [(0usize, 1usize), (1, 2), (2, 0)] {
            let (dp, dq) = (values[i], values[j]);
            if (dp > 0.0 && dq < 0.0) || (dp < 0.0 && dq > 0.0) {
                let t = dp / (dp - dq);
                crossings.push(corners[i] + (corners[j] - corners[i]) * t);
            }
        }

        if let [a, b] = crossings[..] {
            segments.push(Segment { a, b });
        }
    }

    Ok(segments)
}
