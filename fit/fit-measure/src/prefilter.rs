//! Coarse screening predicates on descriptors.
//!
//! Both filters come from the production pipeline: they run on the cheap
//! [`CoarseDescriptor`](crate::CoarseDescriptor)s and skip candidates that
//! cannot possibly pass the expensive alignment and clearance stages.

use crate::CoarseDescriptor;

/// Relative tolerance of the volume bound.
pub const VOLUME_TOLERANCE: f64 = 0.001;

/// Chi-squared acceptance threshold of the shape filter.
pub const CHI2_THRESHOLD: f64 = 0.3;

/// Steiner lower bound on the candidate volume.
///
/// Enclosing the target with wall `clearance` everywhere needs at least
/// `V_target + A_target * clearance` of material; a candidate below that
/// (minus [`VOLUME_TOLERANCE`]) cannot pass and is skipped.
#[must_use]
pub fn volume_prefilter(
    target: &CoarseDescriptor,
    candidate: &CoarseDescriptor,
    clearance: f64,
) -> bool {
    let min_volume = (target.area.mul_add(clearance, target.volume)) * (1.0 - VOLUME_TOLERANCE);
    candidate.volume >= min_volume
}

/// Shape similarity filter on the normal orientation histograms.
///
/// Accepts the candidate when the chi-squared distance between the two
/// 8x16 histograms is below [`CHI2_THRESHOLD`]. Grossly different shapes
/// (a heel block against a full last) fail long before registration runs.
#[must_use]
pub fn shape_prefilter(target: &CoarseDescriptor, candidate: &CoarseDescriptor) -> bool {
    target.histogram_chi2(candidate) < CHI2_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coarse_features;
    use approx::assert_relative_eq;
    use fit_types::{centered_cube, TriMesh, Vertex};

    #[test]
    fn volume_bound_accepts_roomy_candidate() {
        let target = coarse_features(&centered_cube(1.0));
        let candidate = coarse_features(&centered_cube(1.4));
        assert!(volume_prefilter(&target, &candidate, 0.1));
    }

    #[test]
    fn volume_bound_rejects_insufficient_material() {
        let target = coarse_features(&centered_cube(1.0));
        let candidate = coarse_features(&centered_cube(1.01));
        // Needs 1 + 6 * 0.1 = 1.6 of volume; 1.01^3 is nowhere near.
        assert!(!volume_prefilter(&target, &candidate, 0.1));
    }

    #[test]
    fn volume_bound_is_exactly_steiner() {
        let target = coarse_features(&centered_cube(1.0));
        // V + A * c = 1 + 6 * 0.05 = 1.3
        let required = (1.3_f64 * (1.0 - VOLUME_TOLERANCE)).cbrt();
        let just_below = coarse_features(&centered_cube(required - 0.001));
        let just_above = coarse_features(&centered_cube(required + 0.001));
        assert!(!volume_prefilter(&target, &just_below, 0.05));
        assert!(volume_prefilter(&target, &just_above, 0.05));
        assert_relative_eq!(target.area, 6.0, epsilon = 1e-10);
    }

    #[test]
    fn shape_filter_accepts_self() {
        let features = coarse_features(&centered_cube(1.0));
        assert!(shape_prefilter(&features, &features));
        assert_relative_eq!(features.histogram_chi2(&features), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn shape_filter_rejects_different_orientation_profile() {
        let cube = coarse_features(&centered_cube(1.0));

        // A flat sheet: every normal in the +-z bins.
        let mut sheet = TriMesh::new();
        sheet.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        sheet.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        sheet.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
        sheet.vertices.push(Vertex::from_coords(1.0, 1.0, 0.0));
        sheet.faces.push([0, 1, 2]);
        sheet.faces.push([1, 3, 2]);
        let sheet = coarse_features(&sheet);

        assert!(!shape_prefilter(&cube, &sheet));
    }
}
