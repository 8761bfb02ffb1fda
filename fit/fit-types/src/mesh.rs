//! Indexed triangle mesh.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Aabb, MeshError, MeshResult, Triangle, Vertex};

/// An indexed triangle mesh.
///
/// Stores vertices and faces separately, with faces referencing vertices by
/// index. A mesh without faces degenerates to a point set; several pipeline
/// operations (sampling, registration) accept that form.
///
/// # Winding Order
///
/// Faces use **counter-clockwise (CCW) winding** when viewed from outside,
/// so normals point outward by the right-hand rule. The inside/outside
/// queries in the distance oracle depend on this.
///
/// # Example
///
/// ```
/// use fit_types::{TriMesh, Vertex};
///
/// let mut mesh = TriMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
///
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.face_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TriMesh {
    /// Vertex data.
    pub vertices: Vec<Vertex>,

    /// Triangle faces as indices into the vertex array.
    /// Each face is `[v0, v1, v2]` with counter-clockwise winding.
    pub faces: Vec<[u32; 3]>,
}

impl TriMesh {
    /// Create a new empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Create a mesh from vertices and faces.
    #[inline]
    #[must_use]
    pub const fn from_parts(vertices: Vec<Vertex>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Create a mesh from raw coordinate and index data.
    ///
    /// This is the ingest entry point for callers holding flat arrays.
    ///
    /// # Arguments
    ///
    /// * `positions` - Flat array of vertex positions `[x0, y0, z0, x1, ...]`
    /// * `indices` - Flat array of face indices `[a0, b0, c0, a1, ...]`
    ///
    /// # Errors
    ///
    /// Returns an error if either array length is not a multiple of 3, or
    /// any face index is out of range for the vertex array.
    ///
    /// # Example
    ///
    /// ```
    /// use fit_types::TriMesh;
    ///
    /// let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    /// let indices = [0, 1, 2];
    ///
    /// let mesh = TriMesh::from_raw(&positions, &indices).unwrap();
    /// assert_eq!(mesh.vertex_count(), 3);
    /// ```
    pub fn from_raw(positions: &[f64], indices: &[u32]) -> MeshResult<Self> {
        if positions.len() % 3 != 0 {
            return Err(MeshError::BadPositionShape {
                len: positions.len(),
            });
        }
        if indices.len() % 3 != 0 {
            return Err(MeshError::BadIndexShape { len: indices.len() });
        }

        let vertex_count = positions.len() / 3;
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }

        let vertices = positions
            .chunks_exact(3)
            .map(|c| Vertex::from_coords(c[0], c[1], c[2]))
            .collect();
        let faces = indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();

        Ok(Self { vertices, faces })
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces.
    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// A mesh is empty when it has no faces.
    ///
    /// A face-free mesh with vertices is a point set, which `is_empty`
    /// reports as empty; use [`TriMesh::vertex_count`] to distinguish.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Resolve a face into a [`Triangle`], if the index is valid.
    #[must_use]
    pub fn triangle(&self, face_index: usize) -> Option<Triangle> {
        self.faces.get(face_index).map(|&[i0, i1, i2]| {
            Triangle::new(
                self.vertices[i0 as usize].position,
                self.vertices[i1 as usize].position,
                self.vertices[i2 as usize].position,
            )
        })
    }

    /// Iterate faces as resolved [`Triangle`]s.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.faces.iter().map(|&[i0, i1, i2]| {
            Triangle::new(
                self.vertices[i0 as usize].position,
                self.vertices[i1 as usize].position,
                self.vertices[i2 as usize].position,
            )
        })
    }

    /// Iterate vertex positions.
    pub fn positions(&self) -> impl Iterator<Item = &Point3<f64>> + '_ {
        self.vertices.iter().map(|v| &v.position)
    }

    /// Bounding box over all vertices.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.positions())
    }

    /// Translate all vertices by the given vector.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        for vertex in &mut self.vertices {
            vertex.position += offset;
        }
    }

    /// Compute the signed volume of the mesh.
    ///
    /// Sum of signed tetrahedra volumes formed by each face and the origin.
    /// For a closed mesh with outward-facing normals this is positive; a
    /// negative value means the mesh is inside-out.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        let mut volume = 0.0;

        for &[i0, i1, i2] in &self.faces {
            let v0 = &self.vertices[i0 as usize].position;
            let v1 = &self.vertices[i1 as usize].position;
            let v2 = &self.vertices[i2 as usize].position;

            // Signed volume of tetrahedron with origin = (v0 . (v1 x v2)) / 6
            let cross = Vector3::new(
                v1.y.mul_add(v2.z, -(v1.z * v2.y)),
                v1.z.mul_add(v2.x, -(v1.x * v2.z)),
                v1.x.mul_add(v2.y, -(v1.y * v2.x)),
            );
            volume += v0.z.mul_add(cross.z, v0.x.mul_add(cross.x, v0.y * cross.y));
        }

        volume / 6.0
    }

    /// Absolute volume of the mesh.
    #[inline]
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    /// Total surface area of the mesh.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.triangles().map(|tri| tri.area()).sum()
    }

    /// Reverse the winding order of all faces.
    ///
    /// Needed after a transform with negative determinant (a mirror), which
    /// turns the mesh inside-out.
    pub fn flip_faces(&mut self) {
        for face in &mut self.faces {
            face.swap(1, 2);
        }
        for vertex in &mut self.vertices {
            if let Some(ref mut normal) = vertex.attributes.normal {
                *normal = -*normal;
            }
        }
    }
}

/// Create a unit cube mesh from (0,0,0) to (1,1,1).
///
/// # Example
///
/// ```
/// use fit_types::unit_cube;
///
/// let cube = unit_cube();
/// assert_eq!(cube.vertex_count(), 8);
/// assert_eq!(cube.face_count(), 12);
/// ```
#[must_use]
pub fn unit_cube() -> TriMesh {
    let mut mesh = centered_cube(1.0);
    mesh.translate(Vector3::new(0.5, 0.5, 0.5));
    mesh
}

/// Create an axis-aligned cube of the given edge length centred at the origin.
///
/// Faces wind counter-clockwise viewed from outside, so the signed volume is
/// positive. The nested-cube fixtures in the clearance tests are built from
/// this.
#[must_use]
pub fn centered_cube(edge: f64) -> TriMesh {
    let h = edge * 0.5;
    let mut mesh = TriMesh::with_capacity(8, 12);

    mesh.vertices.push(Vertex::from_coords(-h, -h, -h)); // 0
    mesh.vertices.push(Vertex::from_coords(h, -h, -h)); // 1
    mesh.vertices.push(Vertex::from_coords(h, h, -h)); // 2
    mesh.vertices.push(Vertex::from_coords(-h, h, -h)); // 3
    mesh.vertices.push(Vertex::from_coords(-h, -h, h)); // 4
    mesh.vertices.push(Vertex::from_coords(h, -h, h)); // 5
    mesh.vertices.push(Vertex::from_coords(h, h, h)); // 6
    mesh.vertices.push(Vertex::from_coords(-h, h, h)); // 7

    // Bottom (z = -h), normal -Z
    mesh.faces.push([0, 2, 1]);
    mesh.faces.push([0, 3, 2]);
    // Top (z = +h), normal +Z
    mesh.faces.push([4, 5, 6]);
    mesh.faces.push([4, 6, 7]);
    // Front (y = -h), normal -Y
    mesh.faces.push([0, 1, 5]);
    mesh.faces.push([0, 5, 4]);
    // Back (y = +h), normal +Y
    mesh.faces.push([3, 7, 6]);
    mesh.faces.push([3, 6, 2]);
    // Left (x = -h), normal -X
    mesh.faces.push([0, 4, 7]);
    mesh.faces.push([0, 7, 3]);
    // Right (x = +h), normal +X
    mesh.faces.push([1, 2, 6]);
    mesh.faces.push([1, 6, 5]);

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_valid() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let indices = [0, 1, 2];
        let mesh = TriMesh::from_raw(&positions, &indices).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn from_raw_bad_position_shape() {
        let result = TriMesh::from_raw(&[0.0, 0.0], &[]);
        assert!(matches!(result, Err(MeshError::BadPositionShape { len: 2 })));
    }

    #[test]
    fn from_raw_bad_index_shape() {
        let result = TriMesh::from_raw(&[0.0, 0.0, 0.0], &[0, 0]);
        assert!(matches!(result, Err(MeshError::BadIndexShape { len: 2 })));
    }

    #[test]
    fn from_raw_index_out_of_range() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let result = TriMesh::from_raw(&positions, &[0, 1, 3]);
        assert!(matches!(
            result,
            Err(MeshError::IndexOutOfRange { index: 3, .. })
        ));
    }

    #[test]
    fn unit_cube_volume_and_area() {
        let cube = unit_cube();
        assert!((cube.signed_volume() - 1.0).abs() < 1e-10);
        assert!((cube.surface_area() - 6.0).abs() < 1e-10);
    }

    #[test]
    fn centered_cube_volume_scales() {
        let cube = centered_cube(2.0);
        assert!((cube.volume() - 8.0).abs() < 1e-10);
        let b = cube.bounds();
        assert!((b.min.x + 1.0).abs() < 1e-12);
        assert!((b.max.z - 1.0).abs() < 1e-12);
    }

    #[test]
    fn flipped_cube_is_inside_out() {
        let mut cube = unit_cube();
        cube.flip_faces();
        assert!(cube.signed_volume() < 0.0);
    }

    #[test]
    fn translate_moves_bounds() {
        let mut cube = centered_cube(1.0);
        cube.translate(Vector3::new(10.0, 0.0, 0.0));
        assert!((cube.bounds().center().x - 10.0).abs() < 1e-12);
    }

    #[test]
    fn point_set_is_reported_empty() {
        let mut mesh = TriMesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 1);
    }
}
