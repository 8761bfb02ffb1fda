//! Mesh sanitation: degenerate and duplicate geometry removal.
//!
//! Scanned lasts and blanks routinely arrive with duplicated vertices and
//! zero-area faces. Sanitation establishes the invariants the rest of the
//! pipeline assumes: no face has two equal indices, no two faces are
//! index-identical up to permutation, no vertex is bit-identical to another,
//! and every vertex is referenced when the mesh has any face at all.

use hashbrown::{HashMap, HashSet};

use crate::{TriMesh, Vertex};

/// Key for bit-exact vertex deduplication.
fn position_key(vertex: &Vertex) -> [u64; 3] {
    [
        vertex.position.x.to_bits(),
        vertex.position.y.to_bits(),
        vertex.position.z.to_bits(),
    ]
}

/// Remove degenerate and duplicate geometry from a mesh.
///
/// The passes run in an order that makes the result a fixpoint:
///
/// 1. Deduplicate bit-identical vertices, remapping faces onto the first
///    occurrence of each position.
/// 2. Drop faces whose indices are not pairwise distinct (this also covers
///    faces whose corners were coincident before the remap).
/// 3. Drop duplicate faces, treating each face as an index multiset.
/// 4. Drop vertices no remaining face references. A face-free mesh is a
///    point set and keeps all its vertices.
///
/// All passes keep first-occurrence order, so the output is deterministic
/// and running `sanitize` on its own output returns it unchanged.
///
/// # Example
///
/// ```
/// use fit_types::{sanitize, TriMesh, Vertex};
///
/// let mut mesh = TriMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0)); // duplicate
/// mesh.faces.push([0, 1, 2]);
/// mesh.faces.push([0, 1, 3]); // same triangle through the duplicate
/// mesh.faces.push([1, 1, 2]); // degenerate
///
/// let clean = sanitize(&mesh);
/// assert_eq!(clean.vertex_count(), 3);
/// assert_eq!(clean.face_count(), 1);
/// ```
#[must_use]
pub fn sanitize(mesh: &TriMesh) -> TriMesh {
    // Pass 1: bit-exact vertex dedup with face remap.
    let mut first_of: HashMap<[u64; 3], u32> = HashMap::with_capacity(mesh.vertices.len());
    let mut remap: Vec<u32> = Vec::with_capacity(mesh.vertices.len());
    let mut vertices: Vec<Vertex> = Vec::with_capacity(mesh.vertices.len());

    for vertex in &mesh.vertices {
        let key = position_key(vertex);
        let next = u32::try_from(vertices.len()).unwrap_or(u32::MAX);
        let index = *first_of.entry(key).or_insert(next);
        if index == next {
            vertices.push(vertex.clone());
        }
        remap.push(index);
    }

    // Passes 2 and 3: degenerate and duplicate faces.
    let mut seen: HashSet<[u32; 3]> = HashSet::with_capacity(mesh.faces.len());
    let mut faces: Vec<[u32; 3]> = Vec::with_capacity(mesh.faces.len());

    for face in &mesh.faces {
        let mapped = [
            remap[face[0] as usize],
            remap[face[1] as usize],
            remap[face[2] as usize],
        ];
        if mapped[0] == mapped[1] || mapped[1] == mapped[2] || mapped[0] == mapped[2] {
            continue;
        }

        let mut key = mapped;
        key.sort_unstable();
        if seen.insert(key) {
            faces.push(mapped);
        }
    }

    // Pass 4: sweep unreferenced vertices, unless the mesh is a point set.
    if faces.is_empty() {
        return TriMesh::from_parts(vertices, faces);
    }

    let mut referenced = vec![false; vertices.len()];
    for face in &faces {
        for &i in face {
            referenced[i as usize] = true;
        }
    }

    let mut compact: Vec<u32> = vec![u32::MAX; vertices.len()];
    let mut kept: Vec<Vertex> = Vec::with_capacity(vertices.len());
    for (i, vertex) in vertices.into_iter().enumerate() {
        if referenced[i] {
            compact[i] = u32::try_from(kept.len()).unwrap_or(u32::MAX);
            kept.push(vertex);
        }
    }
    for face in &mut faces {
        for i in face {
            *i = compact[*i as usize];
        }
    }

    TriMesh::from_parts(kept, faces)
}
