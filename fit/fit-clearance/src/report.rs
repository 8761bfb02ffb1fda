//! Result types for the clearance evaluators and diagnostics.

use nalgebra::Point3;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Report of the sampling clearance evaluator.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SamplingReport {
    /// Verdict: `inside_ratio >= 0.999` and
    /// `min_clearance >= clearance + safety_delta`.
    pub pass: bool,

    /// Fraction of target-surface samples strictly inside the candidate.
    pub inside_ratio: f64,

    /// Smallest interior clearance, 0 when no sample was interior.
    pub min_clearance: f64,

    /// Mean interior clearance.
    pub mean_clearance: f64,

    /// 1st-percentile interior clearance (linear index, clipped).
    pub p01_clearance: f64,

    /// 10th-percentile interior clearance.
    pub p10_clearance: f64,

    /// Number of interior samples the statistics are computed over.
    pub samples_inside: usize,
}

/// Full report of the voxel narrow-band verifier.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VoxelReport {
    /// Verdict: `min_clearance - eps >= clearance`.
    pub pass: bool,

    /// Smallest clearance over surface-shell cells inside the candidate.
    pub min_clearance: f64,

    /// Mean clearance over surface-shell cells inside the candidate.
    pub mean_clearance: f64,

    /// Fraction of narrow-band cells inside the candidate.
    pub inside_ratio: f64,

    /// Voxel edge length the grid was built with.
    pub voxel: f64,

    /// Narrow-band half width.
    pub band: f64,

    /// Worst-case under-estimation of the true clearance,
    /// `(sqrt(3)/2) * voxel`.
    pub eps: f64,
}

/// Outcome of the voxel verifier: a full report, or a structured failure
/// when the band contained no cells at all.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum VoxelVerdict {
    /// The verifier ran; see the report for the verdict.
    Checked(VoxelReport),

    /// The narrow band was empty; nothing could be verified.
    NoSamples {
        /// Why the verdict is a failure.
        reason: String,
    },
}

impl VoxelVerdict {
    /// Whether the verifier passed.
    #[must_use]
    pub const fn pass(&self) -> bool {
        match self {
            Self::Checked(report) => report.pass,
            Self::NoSamples { .. } => false,
        }
    }

    /// The full report, when the verifier ran.
    #[must_use]
    pub const fn report(&self) -> Option<&VoxelReport> {
        match self {
            Self::Checked(report) => Some(report),
            Self::NoSamples { .. } => None,
        }
    }
}

/// The thinnest point of the wall between target and candidate.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThinnestPoint {
    /// Clearance at the thinnest target vertex.
    pub min_clearance: f64,

    /// The target vertex realising the minimum.
    pub p_target: Point3<f64>,

    /// The closest point on the candidate surface.
    pub p_candidate: Point3<f64>,

    /// Index of the target vertex.
    pub index: usize,
}

/// A connected cluster of thin target vertices.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThinRegion {
    /// Indices of the member vertices in the target mesh, ascending.
    pub indices: Vec<usize>,

    /// Smallest clearance inside the cluster.
    pub min_clearance: f64,

    /// Mean position of the member vertices.
    pub centroid: Point3<f64>,

    /// Extreme points along the cluster's dominant PCA axis.
    pub endpoints: (Point3<f64>, Point3<f64>),
}

/// Fore/aft half of the last along its length axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ForeAft {
    /// Positive side of the length axis.
    Toe,
    /// Negative side of the length axis.
    Heel,
}

/// Inner/outer side of the last along its width axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Side {
    /// Negative side of the width axis.
    Medial,
    /// Positive side of the width axis.
    Lateral,
}

/// Anatomical tag of a thin region, derived from the target's PCA axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegionLabel {
    /// Toe or heel half.
    pub fore_aft: ForeAft,
    /// Medial or lateral side.
    pub side: Side,
}

impl fmt::Display for RegionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fore_aft = match self.fore_aft {
            ForeAft::Toe => "toe",
            ForeAft::Heel => "heel",
        };
        let side = match self.side {
            Side::Medial => "medial",
            Side::Lateral => "lateral",
        };
        write!(f, "{fore_aft}/{side}")
    }
}

/// A thin region with its anatomical label.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LabeledRegion {
    /// The underlying cluster.
    pub region: ThinRegion,
    /// Anatomical tag.
    pub label: RegionLabel,
}
