//! Uniform surface sampling and voxel downsampling.

use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use fit_types::{PointCloud, TriMesh};

use crate::{CloudError, CloudResult};

/// Seed for the sampling generator.
///
/// Fixed so that identical inputs produce bitwise-identical clouds across
/// runs; regression tests depend on this.
pub const SAMPLE_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

/// Draw `count` points uniformly from the surface of a mesh.
///
/// Triangles are selected with probability proportional to their area and a
/// uniform barycentric point is drawn on the chosen triangle. A mesh without
/// faces (or without any positive-area triangle) degenerates to its vertex
/// set, so registration still has something to work with on point-set input.
///
/// # Example
///
/// ```
/// use fit_types::unit_cube;
/// use fit_cloud::sample_surface;
///
/// let cloud = sample_surface(&unit_cube(), 1000);
/// assert_eq!(cloud.len(), 1000);
/// ```
#[must_use]
pub fn sample_surface(mesh: &TriMesh, count: usize) -> PointCloud {
    let areas: Vec<f64> = mesh.triangles().map(|t| t.area()).collect();
    let total: f64 = areas.iter().sum();

    if mesh.faces.is_empty() || total <= 0.0 {
        debug!(
            vertices = mesh.vertex_count(),
            "sampling fell back to vertex cloud"
        );
        return PointCloud::from_points(mesh.positions().copied().collect());
    }

    // Cumulative area table for O(log M) triangle selection.
    let mut cumulative = Vec::with_capacity(areas.len());
    let mut acc = 0.0;
    for area in &areas {
        acc += area;
        cumulative.push(acc);
    }

    let mut rng = StdRng::seed_from_u64(SAMPLE_SEED);
    let mut points = Vec::with_capacity(count);

    for _ in 0..count {
        let r = rng.gen::<f64>() * total;
        let face = cumulative.partition_point(|&c| c < r).min(areas.len() - 1);
        let tri = match mesh.triangle(face) {
            Some(tri) => tri,
            None => continue,
        };

        // Uniform barycentric draw: P = (1 - sqrt(u)) A + sqrt(u)(1 - v) B + sqrt(u) v C
        let su = rng.gen::<f64>().sqrt();
        let v = rng.gen::<f64>();
        let coords = tri.v0.coords * (1.0 - su)
            + tri.v1.coords * (su * (1.0 - v))
            + tri.v2.coords * (su * v);
        points.push(Point3::from(coords));
    }

    PointCloud::from_points(points)
}

/// Key of the voxel cell containing a point.
#[allow(clippy::cast_possible_truncation)]
// Truncation: cell coordinates of practical meshes fit i64 by a wide margin.
fn cell_key(p: &Point3<f64>, voxel: f64) -> (i64, i64, i64) {
    (
        (p.x / voxel).floor() as i64,
        (p.y / voxel).floor() as i64,
        (p.z / voxel).floor() as i64,
    )
}

/// Decimate a cloud on a regular grid, one centroid per occupied cell.
///
/// Normals and features are discarded; they are estimated after
/// downsampling, which is also where the registration pipeline needs them.
/// Cells are emitted in sorted key order so the result is deterministic.
///
/// # Errors
///
/// Returns an error if `voxel` is not strictly positive.
pub fn voxel_downsample(cloud: &PointCloud, voxel: f64) -> CloudResult<PointCloud> {
    if voxel <= 0.0 {
        return Err(CloudError::NonPositiveParameter {
            name: "voxel",
            value: voxel,
        });
    }

    let mut cells: HashMap<(i64, i64, i64), (Vector3<f64>, usize)> =
        HashMap::with_capacity(cloud.len() / 4 + 1);

    for p in &cloud.points {
        let entry = cells
            .entry(cell_key(p, voxel))
            .or_insert((Vector3::zeros(), 0));
        entry.0 += p.coords;
        entry.1 += 1;
    }

    let mut keys: Vec<(i64, i64, i64)> = cells.keys().copied().collect();
    keys.sort_unstable();

    #[allow(clippy::cast_precision_loss)]
    let points = keys
        .iter()
        .map(|k| {
            let (sum, n) = cells[k];
            Point3::from(sum / n as f64)
        })
        .collect();

    debug!(input = cloud.len(), output = keys.len(), voxel, "voxel downsample");
    Ok(PointCloud::from_points(points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fit_types::{unit_cube, Vertex};

    #[test]
    fn sample_count_and_bounds() {
        let cloud = sample_surface(&unit_cube(), 500);
        assert_eq!(cloud.len(), 500);
        for p in &cloud.points {
            assert!((-1e-12..=1.0 + 1e-12).contains(&p.x));
            assert!((-1e-12..=1.0 + 1e-12).contains(&p.y));
            assert!((-1e-12..=1.0 + 1e-12).contains(&p.z));
        }
    }

    #[test]
    fn sampling_is_deterministic() {
        let a = sample_surface(&unit_cube(), 100);
        let b = sample_surface(&unit_cube(), 100);
        for (p, q) in a.points.iter().zip(b.points.iter()) {
            assert_eq!(p, q);
        }
    }

    #[test]
    fn faceless_mesh_falls_back_to_vertices() {
        let mut mesh = TriMesh::new();
        mesh.vertices.push(Vertex::from_coords(1.0, 2.0, 3.0));
        mesh.vertices.push(Vertex::from_coords(4.0, 5.0, 6.0));
        let cloud = sample_surface(&mesh, 1000);
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.points[1], Point3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn downsample_merges_cells() {
        let cloud = PointCloud::from_points(vec![
            Point3::new(0.01, 0.01, 0.01),
            Point3::new(0.02, 0.02, 0.02),
            Point3::new(0.9, 0.9, 0.9),
        ]);
        let down = voxel_downsample(&cloud, 0.5).unwrap();
        assert_eq!(down.len(), 2);
    }

    #[test]
    fn downsample_rejects_bad_voxel() {
        let cloud = PointCloud::from_points(vec![Point3::origin()]);
        assert!(matches!(
            voxel_downsample(&cloud, 0.0),
            Err(CloudError::NonPositiveParameter { name: "voxel", .. })
        ));
    }

    #[test]
    fn downsample_centroid_is_cell_mean() {
        let cloud = PointCloud::from_points(vec![
            Point3::new(0.1, 0.0, 0.0),
            Point3::new(0.3, 0.0, 0.0),
        ]);
        let down = voxel_downsample(&cloud, 1.0).unwrap();
        assert_eq!(down.len(), 1);
        assert!((down.points[0].x - 0.2).abs() < 1e-12);
    }
}
