//! Per-candidate output slots.

use nalgebra::Matrix4;

use fit_clearance::{SamplingReport, VoxelVerdict};

/// Successful align-and-check outcome for one candidate.
#[derive(Debug, Clone)]
pub struct MatchRecord {
    /// Source-to-target transform (already folding in the mirror when
    /// `mirrored`).
    pub transform: Matrix4<f64>,

    /// Symmetric Chamfer distance of the winning pose; the ranking proxy
    /// for material cost.
    pub chamfer: f64,

    /// Whether the mirrored variant won the alignment.
    pub mirrored: bool,

    /// Clearance screening report in the aligned pose.
    pub report: SamplingReport,
}

/// One slot of a [`batch_align_and_check`](crate::batch_align_and_check)
/// result.
///
/// The three variants distinguish "ran" (with its own pass/fail verdict),
/// "skipped before alignment", and "did not run".
#[derive(Debug, Clone)]
pub enum CandidateReport {
    /// The pipeline ran to completion.
    Checked(MatchRecord),

    /// The coarse prefilter skipped the candidate before alignment.
    Skipped {
        /// Why the candidate was skipped.
        reason: String,
    },

    /// The pipeline failed for this candidate; the rest of the batch is
    /// unaffected.
    Failed {
        /// The captured error message.
        error: String,
    },
}

impl CandidateReport {
    /// Whether this candidate passed the clearance verdict.
    #[must_use]
    pub const fn pass(&self) -> bool {
        match self {
            Self::Checked(record) => record.report.pass,
            Self::Skipped { .. } | Self::Failed { .. } => false,
        }
    }

    /// The match record, when the pipeline ran.
    #[must_use]
    pub const fn record(&self) -> Option<&MatchRecord> {
        match self {
            Self::Checked(record) => Some(record),
            Self::Skipped { .. } | Self::Failed { .. } => None,
        }
    }
}

/// One slot of a [`batch_formal_check`](crate::batch_formal_check) result.
#[derive(Debug, Clone)]
pub enum FormalReport {
    /// The verifier ran; the verdict (including the empty-band case) is in
    /// the [`VoxelVerdict`].
    Checked(VoxelVerdict),

    /// The verifier failed for this candidate.
    Failed {
        /// The captured error message.
        error: String,
    },
}

impl FormalReport {
    /// Whether this candidate passed the formal verdict.
    #[must_use]
    pub const fn pass(&self) -> bool {
        match self {
            Self::Checked(verdict) => verdict.pass(),
            Self::Failed { .. } => false,
        }
    }
}
