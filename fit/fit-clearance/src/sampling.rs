//! Sampling clearance evaluator.

use rayon::prelude::*;
use tracing::info;

use fit_cloud::sample_surface;
use fit_sdf::DistanceScene;
use fit_types::TriMesh;

use crate::{ClearanceResult, SamplingParams, SamplingReport};

/// Minimum fraction of samples that must fall inside the candidate.
/// The slack absorbs occupancy jitter for samples numerically on the
/// candidate surface.
const INSIDE_RATIO_THRESHOLD: f64 = 0.999;

/// Screen a candidate by sampling the target surface against its signed
/// distance field.
///
/// Draws `params.samples` uniform points on the target surface, classifies
/// each against the candidate, and records the unsigned distance of every
/// interior sample as its clearance. The verdict requires (nearly) every
/// sample inside and the worst clearance above
/// `clearance + safety_delta`.
///
/// # Errors
///
/// Returns an error on out-of-domain parameters or when the candidate mesh
/// has no faces.
///
/// # Example
///
/// ```
/// use fit_types::centered_cube;
/// use fit_clearance::{clearance_sampling, SamplingParams};
///
/// let report = clearance_sampling(
///     &centered_cube(1.0),
///     &centered_cube(1.2),
///     &SamplingParams::new(0.05, 0.0, 4000),
/// )
/// .unwrap();
/// assert!(report.pass);
/// assert!((report.min_clearance - 0.1).abs() < 0.02);
/// ```
pub fn clearance_sampling(
    target: &TriMesh,
    candidate: &TriMesh,
    params: &SamplingParams,
) -> ClearanceResult<SamplingReport> {
    params.validate()?;

    let samples = sample_surface(target, params.samples);
    let scene = DistanceScene::new(candidate)?;

    // (inside, distance) per sample; the reduction below is sequential so
    // the report does not depend on worker scheduling.
    let classified: Vec<(bool, f64)> = samples
        .points
        .par_iter()
        .map(|p| (scene.is_inside(p), scene.unsigned_distance(p)))
        .collect();

    let total = classified.len().max(1);
    let mut interior: Vec<f64> = classified
        .iter()
        .filter(|(inside, _)| *inside)
        .map(|&(_, d)| d)
        .collect();

    #[allow(clippy::cast_precision_loss)]
    let inside_ratio = interior.len() as f64 / total as f64;

    if interior.is_empty() {
        info!(inside_ratio, "no interior samples; candidate cannot enclose target");
        return Ok(SamplingReport {
            pass: false,
            inside_ratio,
            min_clearance: 0.0,
            mean_clearance: 0.0,
            p01_clearance: 0.0,
            p10_clearance: 0.0,
            samples_inside: 0,
        });
    }

    interior.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    debug_assert!(interior[0] >= 0.0, "clearances must be non-negative");

    let min_clearance = interior[0];
    #[allow(clippy::cast_precision_loss)]
    let mean_clearance = interior.iter().sum::<f64>() / interior.len() as f64;
    let p01_clearance = interior[percentile_index(interior.len(), 0.01)];
    let p10_clearance = interior[percentile_index(interior.len(), 0.10)];

    let pass = inside_ratio >= INSIDE_RATIO_THRESHOLD
        && min_clearance >= params.clearance + params.safety_delta;

    info!(
        pass,
        inside_ratio,
        min_clearance,
        mean_clearance,
        p01_clearance,
        "sampling clearance finished"
    );

    Ok(SamplingReport {
        pass,
        inside_ratio,
        min_clearance,
        mean_clearance,
        p01_clearance,
        p10_clearance,
        samples_inside: interior.len(),
    })
}

/// Linear percentile index `floor(q * n)`, clipped to the array.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
// Truncation/sign: the operand is a clipped non-negative index.
fn percentile_index(n: usize, q: f64) -> usize {
    #[allow(clippy::cast_precision_loss)]
    let k = (q * n as f64).floor() as usize;
    k.min(n - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fit_types::centered_cube;

    #[test]
    fn nested_cubes_pass_with_expected_minimum() {
        let report = clearance_sampling(
            &centered_cube(1.0),
            &centered_cube(1.4),
            &SamplingParams::new(0.1, 0.0, 3000),
        )
        .unwrap();

        assert!(report.pass);
        assert!(report.inside_ratio > 0.999);
        assert!(
            (report.min_clearance - 0.2).abs() < 0.05,
            "min {}",
            report.min_clearance
        );
        assert!(report.mean_clearance >= report.min_clearance);
        assert!(report.p01_clearance >= report.min_clearance);
        assert!(report.p10_clearance >= report.p01_clearance);
    }

    #[test]
    fn identical_meshes_fail() {
        let cube = centered_cube(1.0);
        let report =
            clearance_sampling(&cube, &cube, &SamplingParams::new(0.1, 0.0, 2000)).unwrap();
        assert!(!report.pass);
    }

    #[test]
    fn safety_delta_tightens_the_rule() {
        let target = centered_cube(1.0);
        let blank = centered_cube(1.4);
        // True clearance is 0.2; bare rule passes at 0.15...
        let bare =
            clearance_sampling(&target, &blank, &SamplingParams::new(0.15, 0.0, 2000)).unwrap();
        assert!(bare.pass);
        // ...but a 0.1 safety margin pushes the threshold past it.
        let tightened =
            clearance_sampling(&target, &blank, &SamplingParams::new(0.15, 0.1, 2000)).unwrap();
        assert!(!tightened.pass);
    }

    #[test]
    fn disjoint_candidate_reports_zero_inside() {
        let target = centered_cube(1.0);
        let mut candidate = centered_cube(1.0);
        candidate.translate(nalgebra::Vector3::new(10.0, 0.0, 0.0));
        let report =
            clearance_sampling(&target, &candidate, &SamplingParams::new(0.1, 0.0, 500)).unwrap();
        assert!(!report.pass);
        assert_eq!(report.samples_inside, 0);
        assert!(report.inside_ratio < 1e-12);
    }

    #[test]
    fn invalid_samples_rejected() {
        let cube = centered_cube(1.0);
        assert!(clearance_sampling(&cube, &cube, &SamplingParams::new(0.1, 0.0, 0)).is_err());
    }

    #[test]
    fn percentile_index_clips() {
        assert_eq!(percentile_index(100, 0.01), 1);
        assert_eq!(percentile_index(10, 0.01), 0);
        assert_eq!(percentile_index(1, 0.99), 0);
    }
}
