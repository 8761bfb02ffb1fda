//! Coarse shape descriptor.

use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use fit_types::TriMesh;

/// Polar bins of the orientation histogram.
const THETA_BINS: usize = 8;
/// Azimuthal bins of the orientation histogram.
const PHI_BINS: usize = 16;
/// Total bins of the orientation histogram.
pub const HIST_BINS: usize = THETA_BINS * PHI_BINS;

/// Cheap whole-mesh descriptor: enough to rank and screen candidates
/// without touching the surface geometry again.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CoarseDescriptor {
    /// Enclosed volume, `|sum(a . (b x c))| / 6` over all faces.
    pub volume: f64,

    /// Total surface area.
    pub area: f64,

    /// Axis-aligned bounding-box extents.
    pub extents: Vector3<f64>,

    /// 8x16 orientation histogram of face normals, one count per
    /// positive-area face, normalised to sum 1 (all zero when the mesh has
    /// no positive-area face).
    #[cfg_attr(feature = "serde", serde(with = "serde_big_array::BigArray"))]
    pub normal_hist: [f32; HIST_BINS],
}

impl CoarseDescriptor {
    /// Chi-squared distance between two orientation histograms.
    ///
    /// Used by the shape prefilter; 0 for identical histograms.
    #[must_use]
    pub fn histogram_chi2(&self, other: &Self) -> f64 {
        self.normal_hist
            .iter()
            .zip(other.normal_hist.iter())
            .map(|(&a, &b)| {
                let (a, b) = (f64::from(a), f64::from(b));
                let denom = a + b + 1e-10;
                (a - b) * (a - b) / denom
            })
            .sum()
    }
}

/// Compute the coarse descriptor of a mesh.
///
/// The orientation histogram bins each face normal by inclination
/// `theta = acos(clamp(n_z, -1, 1))` over [`THETA_BINS`] bins and azimuth
/// `phi = atan2(n_y, n_x)` wrapped to `[0, 2pi)` over [`PHI_BINS`] bins,
/// clipping at the top edges. Volume and histogram are invariant under
/// rigid motion and rotation about Z respectively; the batch prefilters
/// rely on the volume being exact for closed meshes.
///
/// # Example
///
/// ```
/// use fit_types::centered_cube;
/// use fit_measure::coarse_features;
///
/// let features = coarse_features(&centered_cube(2.0));
/// assert!((features.volume - 8.0).abs() < 1e-9);
/// assert!((features.extents.x - 2.0).abs() < 1e-12);
/// let total: f32 = features.normal_hist.iter().sum();
/// assert!((total - 1.0).abs() < 1e-6);
/// ```
#[must_use]
pub fn coarse_features(mesh: &TriMesh) -> CoarseDescriptor {
    let volume = mesh.volume();
    let area = mesh.surface_area();
    let bounds = mesh.bounds();
    let extents = if bounds.is_empty() {
        Vector3::zeros()
    } else {
        bounds.size()
    };

    let mut normal_hist = [0.0f32; HIST_BINS];
    let mut counted = 0u32;

    for triangle in mesh.triangles() {
        let Some(normal) = triangle.normal() else {
            continue;
        };

        let theta = normal.z.clamp(-1.0, 1.0).acos();
        let mut phi = normal.y.atan2(normal.x);
        if phi < 0.0 {
            phi += 2.0 * std::f64::consts::PI;
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        // Truncation/sign: both operands are clipped non-negative indices.
        let i = ((theta / std::f64::consts::PI * THETA_BINS as f64) as usize).min(THETA_BINS - 1);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let j = ((phi / (2.0 * std::f64::consts::PI) * PHI_BINS as f64) as usize).min(PHI_BINS - 1);

        normal_hist[i * PHI_BINS + j] += 1.0;
        counted += 1;
    }

    if counted > 0 {
        #[allow(clippy::cast_precision_loss)]
        let inv = 1.0 / counted as f32;
        for bin in &mut normal_hist {
            *bin *= inv;
        }
    }

    CoarseDescriptor {
        volume,
        area,
        extents,
        normal_hist,
    }
}
