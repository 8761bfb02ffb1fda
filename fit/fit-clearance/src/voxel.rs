//! Voxel narrow-band SDF verifier.
//!
//! The authoritative clearance check. A regular grid is laid over the
//! target's expanded bounding box; cells near the target surface are
//! evaluated against the candidate's signed distance field, and the
//! worst-case clearance is reported together with the bound `eps` on how
//! far it can under-estimate the truth.

use nalgebra::Point3;
use rayon::prelude::*;
use tracing::{info, warn};

use fit_sdf::DistanceScene;
use fit_types::TriMesh;

use crate::{ClearanceError, ClearanceResult, VoxelParams, VoxelReport, VoxelVerdict};

/// Cap on the voxel-cell product before any allocation happens.
pub const CELL_CAP: usize = 1 << 28;

/// One evaluated band cell.
struct BandCell {
    /// Unsigned distance to the target surface.
    target_distance: f64,
    /// Signed distance to the candidate surface.
    candidate_signed: f64,
}

/// Verify clearance on a narrow-band voxel grid.
///
/// Cell centres sit at `min + (i + 1/2) * voxel` of the target bounding box
/// expanded by `band`. Cells within `band` of the target surface form the
/// band population (`inside_ratio`); the subset within `eps` of the surface
/// carries the min/mean statistics: every point of the target surface has
/// a cell centre within `eps = (sqrt(3)/2) * voxel`, which is what makes
/// `reported_min >= true_min - eps` hold. The verdict is
/// `min_clearance - eps >= clearance`.
///
/// # Errors
///
/// Returns an error on out-of-domain parameters, when either mesh has no
/// faces, or when the grid would exceed [`CELL_CAP`] cells.
///
/// # Example
///
/// ```
/// use fit_types::centered_cube;
/// use fit_clearance::{clearance_sdf_volume, VoxelParams};
///
/// let verdict = clearance_sdf_volume(
///     &centered_cube(1.0),
///     &centered_cube(1.4),
///     &VoxelParams::new(0.08, 0.05, 0.3),
/// )
/// .unwrap();
/// assert!(verdict.pass());
/// ```
pub fn clearance_sdf_volume(
    target: &TriMesh,
    candidate: &TriMesh,
    params: &VoxelParams,
) -> ClearanceResult<VoxelVerdict> {
    params.validate()?;

    let target_scene = DistanceScene::new(target)?;
    let candidate_scene = DistanceScene::new(candidate)?;

    let bounds = target.bounds().expanded(params.band);
    let extent = bounds.size();

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    // Truncation/sign: extents are positive and the cap bounds the result.
    let dims: [usize; 3] = [
        ((extent.x / params.voxel).ceil() as usize).max(1),
        ((extent.y / params.voxel).ceil() as usize).max(1),
        ((extent.z / params.voxel).ceil() as usize).max(1),
    ];

    let cells = dims.iter().map(|&d| d as u128).product::<u128>();
    if cells > CELL_CAP as u128 {
        return Err(ClearanceError::GridTooLarge {
            cells,
            cap: CELL_CAP,
        });
    }
    #[allow(clippy::cast_possible_truncation)]
    let cell_count = cells as usize;

    let origin = bounds.min;
    let voxel = params.voxel;
    let band = params.band;

    // Band cells, evaluated in parallel, reduced sequentially.
    let band_cells: Vec<BandCell> = (0..cell_count)
        .into_par_iter()
        .filter_map(|flat| {
            let ix = flat / (dims[1] * dims[2]);
            let iy = (flat / dims[2]) % dims[1];
            let iz = flat % dims[2];

            #[allow(clippy::cast_precision_loss)]
            let centre = Point3::new(
                (ix as f64 + 0.5).mul_add(voxel, origin.x),
                (iy as f64 + 0.5).mul_add(voxel, origin.y),
                (iz as f64 + 0.5).mul_add(voxel, origin.z),
            );

            let target_distance = target_scene.unsigned_distance(&centre);
            if target_distance > band {
                return None;
            }
            let candidate_signed = candidate_scene.signed_distance(&centre);
            Some(BandCell {
                target_distance,
                candidate_signed,
            })
        })
        .collect();

    if band_cells.is_empty() {
        warn!("narrow band is empty, nothing to verify");
        return Ok(VoxelVerdict::NoSamples {
            reason: "no samples in band".to_string(),
        });
    }

    let eps = params.eps();

    let inside_band = band_cells
        .iter()
        .filter(|c| c.candidate_signed <= 0.0)
        .count();
    #[allow(clippy::cast_precision_loss)]
    let inside_ratio = inside_band as f64 / band_cells.len() as f64;

    // Statistics live on the surface shell: cells within eps of the target
    // surface, inside the candidate.
    let mut min_clearance = f64::INFINITY;
    let mut sum = 0.0;
    let mut shell_inside = 0usize;
    for cell in &band_cells {
        if cell.target_distance <= eps && cell.candidate_signed <= 0.0 {
            let clearance = -cell.candidate_signed;
            min_clearance = min_clearance.min(clearance);
            sum += clearance;
            shell_inside += 1;
        }
    }

    let (min_clearance, mean_clearance) = if shell_inside == 0 {
        (0.0, 0.0)
    } else {
        #[allow(clippy::cast_precision_loss)]
        let mean = sum / shell_inside as f64;
        (min_clearance, mean)
    };

    let pass = shell_inside > 0 && min_clearance - eps >= params.clearance;

    info!(
        pass,
        min_clearance,
        mean_clearance,
        inside_ratio,
        eps,
        band_cells = band_cells.len(),
        shell_cells = shell_inside,
        "voxel SDF verification finished"
    );

    Ok(VoxelVerdict::Checked(VoxelReport {
        pass,
        min_clearance,
        mean_clearance,
        inside_ratio,
        voxel: params.voxel,
        band: params.band,
        eps,
    }))
}
