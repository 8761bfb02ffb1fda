//! Rigid transform type and mesh/cloud transform helpers.

use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector3};

use fit_types::{PointCloud, TriMesh};

/// A rigid transformation: rotation followed by translation.
///
/// This is the chart the iterative estimators work in. Final alignment
/// results are exposed as [`Matrix4<f64>`] instead, because the mirror
/// variant composes in a reflection that has no quaternion representation.
///
/// # Example
///
/// ```
/// use fit_registration::RigidTransform;
/// use nalgebra::{Point3, UnitQuaternion, Vector3};
/// use std::f64::consts::PI;
///
/// let rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), PI / 2.0);
/// let transform = RigidTransform::new(rotation, Vector3::new(1.0, 0.0, 0.0));
/// let p = transform.transform_point(&Point3::new(1.0, 0.0, 0.0));
/// assert!((p.y - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    /// Rotation as a unit quaternion.
    pub rotation: UnitQuaternion<f64>,
    /// Translation vector.
    pub translation: Vector3<f64>,
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl RigidTransform {
    /// Creates a rigid transform from rotation and translation.
    #[must_use]
    pub const fn new(rotation: UnitQuaternion<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Creates an identity transform.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            rotation: UnitQuaternion::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Creates a transform with only translation.
    #[must_use]
    pub fn from_translation(translation: Vector3<f64>) -> Self {
        Self {
            rotation: UnitQuaternion::identity(),
            translation,
        }
    }

    /// Creates a transform with only rotation.
    #[must_use]
    pub fn from_rotation(rotation: UnitQuaternion<f64>) -> Self {
        Self {
            rotation,
            translation: Vector3::zeros(),
        }
    }

    /// Transforms a 3D point.
    #[must_use]
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * point.coords + self.translation)
    }

    /// Composes this transform with another (`self * other`).
    ///
    /// The result applies `other` first, then `self`.
    #[must_use]
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            rotation: self.rotation * other.rotation,
            translation: self.translation + self.rotation * other.translation,
        }
    }

    /// Converts to a 4x4 homogeneous transformation matrix.
    #[must_use]
    pub fn to_matrix4(&self) -> Matrix4<f64> {
        let mut mat = Matrix4::identity();
        let rot = self.rotation.to_rotation_matrix();
        mat.fixed_view_mut::<3, 3>(0, 0).copy_from(rot.matrix());
        mat.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.translation);
        mat
    }
}

/// The YZ-plane mirror `diag(-1, 1, 1, 1)`.
///
/// Left-multiplied onto a pose to express the left/right-symmetric variant
/// of a candidate.
#[must_use]
pub fn mirror_yz() -> Matrix4<f64> {
    let mut m = Matrix4::identity();
    m[(0, 0)] = -1.0;
    m
}

/// Applies a homogeneous transform to a mesh, returning the transformed copy.
///
/// When the linear part has negative determinant (a mirror), the transform
/// turns the mesh inside-out; face winding is reversed afterwards so that
/// signed volume and winding-number inside/outside queries stay correct.
///
/// # Example
///
/// ```
/// use fit_types::unit_cube;
/// use fit_registration::{mirror_yz, transform_mesh};
///
/// let mirrored = transform_mesh(&unit_cube(), &mirror_yz());
/// assert!(mirrored.signed_volume() > 0.0);
/// ```
#[must_use]
pub fn transform_mesh(mesh: &TriMesh, transform: &Matrix4<f64>) -> TriMesh {
    let mut result = mesh.clone();
    let linear = transform.fixed_view::<3, 3>(0, 0).into_owned();

    for vertex in &mut result.vertices {
        vertex.position = transform.transform_point(&vertex.position);
        if let Some(ref mut normal) = vertex.attributes.normal {
            if let Some(n) = (linear * *normal).try_normalize(f64::EPSILON) {
                *normal = n;
            }
        }
    }

    if linear.determinant() < 0.0 {
        result.flip_faces();
    }
    result
}

/// Applies a homogeneous transform to a point cloud.
///
/// Normals rotate with the linear part; features are position-independent
/// and carried over unchanged.
#[must_use]
pub fn transform_cloud(cloud: &PointCloud, transform: &Matrix4<f64>) -> PointCloud {
    let linear = transform.fixed_view::<3, 3>(0, 0).into_owned();
    PointCloud {
        points: cloud
            .points
            .iter()
            .map(|p| transform.transform_point(p))
            .collect(),
        normals: cloud.normals.as_ref().map(|normals| {
            normals
                .iter()
                .map(|n| (linear * n).try_normalize(f64::EPSILON).unwrap_or(*n))
                .collect()
        }),
        features: cloud.features.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use fit_types::unit_cube;
    use std::f64::consts::PI;

    #[test]
    fn identity_leaves_points() {
        let t = RigidTransform::identity();
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_relative_eq!(t.transform_point(&p).coords, p.coords, epsilon = 1e-12);
    }

    #[test]
    fn compose_applies_right_first() {
        let rot = RigidTransform::from_rotation(UnitQuaternion::from_axis_angle(
            &Vector3::z_axis(),
            PI / 2.0,
        ));
        let shift = RigidTransform::from_translation(Vector3::new(1.0, 0.0, 0.0));
        // Shift, then rotate: (0,0,0) -> (1,0,0) -> (0,1,0)
        let composed = rot.compose(&shift);
        let p = composed.transform_point(&Point3::origin());
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-12);
        assert!(p.x.abs() < 1e-12);
    }

    #[test]
    fn matrix_matches_transform_point() {
        let t = RigidTransform::new(
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.3),
            Vector3::new(1.0, 2.0, 3.0),
        );
        let p = Point3::new(0.5, -0.5, 2.0);
        let via_matrix = t.to_matrix4().transform_point(&p);
        assert_relative_eq!(
            via_matrix.coords,
            t.transform_point(&p).coords,
            epsilon = 1e-12
        );
    }

    #[test]
    fn mirror_flips_x() {
        let p = mirror_yz().transform_point(&Point3::new(2.0, 1.0, 1.0));
        assert_relative_eq!(p.x, -2.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn mirrored_mesh_keeps_positive_volume() {
        let cube = unit_cube();
        let mirrored = transform_mesh(&cube, &mirror_yz());
        assert_relative_eq!(mirrored.signed_volume(), cube.signed_volume(), epsilon = 1e-10);
    }

    #[test]
    fn rigid_transform_mesh_keeps_winding() {
        let t = RigidTransform::from_translation(Vector3::new(5.0, 0.0, 0.0)).to_matrix4();
        let moved = transform_mesh(&unit_cube(), &t);
        assert_relative_eq!(moved.signed_volume(), 1.0, epsilon = 1e-10);
        assert_relative_eq!(moved.bounds().center().x, 5.5, epsilon = 1e-10);
    }
}
