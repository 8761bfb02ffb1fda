//! The batch drivers.

use rayon::prelude::*;
use rayon::ThreadPool;
use tracing::{info, info_span};

use fit_clearance::{clearance_sampling, clearance_sdf_volume, SamplingParams, VoxelParams};
use fit_measure::{coarse_features, volume_prefilter};
use fit_registration::{align_icp_with_mirror, transform_mesh};
use fit_types::TriMesh;

use crate::{
    BatchError, BatchParams, BatchResult, CandidateReport, FormalCheckParams, FormalReport,
    MatchRecord,
};

/// Build the bounded worker pool for a batch call.
fn build_pool(threads: i32) -> BatchResult<ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if threads > 0 {
        #[allow(clippy::cast_sign_loss)]
        let workers = threads as usize;
        builder = builder.num_threads(workers);
    }
    builder
        .build()
        .map_err(|e| BatchError::ThreadPool(e.to_string()))
}

/// Align every candidate to the target and screen its clearance.
///
/// Per candidate, independently: (optional volume prefilter) ->
/// mirror-aware alignment -> apply the winning transform -> sampling
/// clearance at `clearance + safety_delta`. Slots come back in input
/// order; a failing candidate yields a `Failed` slot and the batch
/// continues.
///
/// # Errors
///
/// Returns an error only for driver-level problems (worker pool
/// construction); per-candidate errors land in their slots.
pub fn batch_align_and_check(
    target: &TriMesh,
    candidates: &[TriMesh],
    params: &BatchParams,
) -> BatchResult<Vec<CandidateReport>> {
    let pool = build_pool(params.threads)?;
    let span = info_span!("batch_align_and_check", candidates = candidates.len());
    let _guard = span.enter();

    let target_features = params.prefilter.then(|| coarse_features(target));
    let sampling = SamplingParams::new(params.clearance, params.safety_delta, params.samples);

    let reports: Vec<CandidateReport> = pool.install(|| {
        candidates
            .par_iter()
            .map(|candidate| {
                if let Some(ref target_features) = target_features {
                    let candidate_features = coarse_features(candidate);
                    if !volume_prefilter(target_features, &candidate_features, params.clearance) {
                        return CandidateReport::Skipped {
                            reason: "insufficient volume".to_string(),
                        };
                    }
                }

                match check_candidate(target, candidate, params, &sampling) {
                    Ok(record) => CandidateReport::Checked(record),
                    Err(error) => CandidateReport::Failed { error },
                }
            })
            .collect()
    });

    let passing = reports.iter().filter(|r| r.pass()).count();
    info!(
        candidates = candidates.len(),
        passing, "batch align-and-check finished"
    );
    Ok(reports)
}

/// The per-candidate pipeline; any error is stringified into the slot.
fn check_candidate(
    target: &TriMesh,
    candidate: &TriMesh,
    params: &BatchParams,
    sampling: &SamplingParams,
) -> Result<MatchRecord, String> {
    let alignment =
        align_icp_with_mirror(candidate, target, &params.align).map_err(|e| e.to_string())?;
    let aligned = transform_mesh(candidate, &alignment.transform);
    let report = clearance_sampling(target, &aligned, sampling).map_err(|e| e.to_string())?;

    Ok(MatchRecord {
        transform: alignment.transform,
        chamfer: alignment.chamfer,
        mirrored: alignment.mirrored,
        report,
    })
}

/// Run the voxel narrow-band verifier over every candidate.
///
/// Candidates are assumed to be in the aligned frame already (the output
/// transform of [`batch_align_and_check`] applied by the caller). Slots
/// come back in input order with per-candidate failure isolation.
///
/// # Errors
///
/// Returns an error only for driver-level problems (worker pool
/// construction).
pub fn batch_formal_check(
    target: &TriMesh,
    candidates: &[TriMesh],
    params: &FormalCheckParams,
) -> BatchResult<Vec<FormalReport>> {
    let pool = build_pool(params.threads)?;
    let span = info_span!("batch_formal_check", candidates = candidates.len());
    let _guard = span.enter();

    let voxel_params = VoxelParams::new(params.clearance, params.voxel, params.band);

    let reports: Vec<FormalReport> = pool.install(|| {
        candidates
            .par_iter()
            .map(
                |candidate| match clearance_sdf_volume(target, candidate, &voxel_params) {
                    Ok(verdict) => FormalReport::Checked(verdict),
                    Err(error) => FormalReport::Failed {
                        error: error.to_string(),
                    },
                },
            )
            .collect()
    });

    let passing = reports.iter().filter(|r| r.pass()).count();
    info!(
        candidates = candidates.len(),
        passing, "batch formal check finished"
    );
    Ok(reports)
}

/// Indices of passing candidates, cheapest material first.
///
/// The Chamfer distance of the winning pose is the cost-of-material proxy:
/// the closer a blank hugs the target, the less is milled away. Slot order
/// of the input is untouched.
#[must_use]
pub fn rank_passing(reports: &[CandidateReport]) -> Vec<usize> {
    let mut passing: Vec<(usize, f64)> = reports
        .iter()
        .enumerate()
        .filter_map(|(i, r)| {
            r.record()
                .filter(|record| record.report.pass)
                .map(|record| (i, record.chamfer))
        })
        .collect();

    passing.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    passing.into_iter().map(|(i, _)| i).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fit_clearance::SamplingReport;
    use nalgebra::Matrix4;

    fn record(pass: bool, chamfer: f64) -> CandidateReport {
        CandidateReport::Checked(MatchRecord {
            transform: Matrix4::identity(),
            chamfer,
            mirrored: false,
            report: SamplingReport {
                pass,
                inside_ratio: 1.0,
                min_clearance: 1.0,
                mean_clearance: 1.0,
                p01_clearance: 1.0,
                p10_clearance: 1.0,
                samples_inside: 100,
            },
        })
    }

    #[test]
    fn rank_orders_by_chamfer_and_skips_failures() {
        let reports = vec![
            record(true, 3.0),
            CandidateReport::Failed {
                error: "boom".to_string(),
            },
            record(true, 1.0),
            record(false, 0.1),
            CandidateReport::Skipped {
                reason: "insufficient volume".to_string(),
            },
        ];
        assert_eq!(rank_passing(&reports), vec![2, 0]);
    }

    #[test]
    fn pool_respects_explicit_thread_count() {
        let pool = build_pool(2).unwrap();
        assert_eq!(pool.current_num_threads(), 2);
    }

    #[test]
    fn auto_thread_count_builds() {
        let pool = build_pool(-1).unwrap();
        assert!(pool.current_num_threads() >= 1);
    }
}
