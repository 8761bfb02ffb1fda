//! Parameters for the clearance evaluators.

use crate::{ClearanceError, ClearanceResult};

/// Parameters for the sampling clearance evaluator.
///
/// # Example
///
/// ```
/// use fit_clearance::SamplingParams;
///
/// let params = SamplingParams::default()
///     .with_clearance(1.0)
///     .with_safety_delta(0.2);
/// assert!((params.clearance - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SamplingParams {
    /// Required clearance in mesh units.
    pub clearance: f64,

    /// Safety margin added to the clearance in the pass rule.
    /// Set to 0 for the bare `min >= clearance` check.
    pub safety_delta: f64,

    /// Number of surface samples drawn on the target.
    pub samples: usize,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            clearance: 2.0,
            safety_delta: 0.3,
            samples: 120_000,
        }
    }
}

impl SamplingParams {
    /// Create params with every knob set.
    #[must_use]
    pub const fn new(clearance: f64, safety_delta: f64, samples: usize) -> Self {
        Self {
            clearance,
            safety_delta,
            samples,
        }
    }

    /// Set the required clearance.
    #[must_use]
    pub const fn with_clearance(mut self, clearance: f64) -> Self {
        self.clearance = clearance;
        self
    }

    /// Set the safety margin.
    #[must_use]
    pub const fn with_safety_delta(mut self, safety_delta: f64) -> Self {
        self.safety_delta = safety_delta;
        self
    }

    /// Set the sample count.
    #[must_use]
    pub const fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    pub(crate) fn validate(&self) -> ClearanceResult<()> {
        if self.clearance < 0.0 {
            return Err(ClearanceError::InvalidParameter(format!(
                "clearance must be >= 0, got {}",
                self.clearance
            )));
        }
        if self.safety_delta < 0.0 {
            return Err(ClearanceError::InvalidParameter(format!(
                "safety_delta must be >= 0, got {}",
                self.safety_delta
            )));
        }
        if self.samples == 0 {
            return Err(ClearanceError::InvalidParameter(
                "samples must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parameters for the voxel narrow-band verifier.
#[derive(Debug, Clone, Copy)]
pub struct VoxelParams {
    /// Required clearance in mesh units.
    pub clearance: f64,

    /// Voxel edge length. The verifier's error bound is
    /// `eps = (sqrt(3)/2) * voxel`.
    pub voxel: f64,

    /// Narrow-band half width around the target surface; also the margin
    /// by which the grid extends past the target bounding box.
    pub band: f64,
}

impl Default for VoxelParams {
    fn default() -> Self {
        Self {
            clearance: 2.0,
            voxel: 0.30,
            band: 8.0,
        }
    }
}

impl VoxelParams {
    /// Create params with every knob set.
    #[must_use]
    pub const fn new(clearance: f64, voxel: f64, band: f64) -> Self {
        Self {
            clearance,
            voxel,
            band,
        }
    }

    /// Set the required clearance.
    #[must_use]
    pub const fn with_clearance(mut self, clearance: f64) -> Self {
        self.clearance = clearance;
        self
    }

    /// Set the voxel edge length.
    #[must_use]
    pub const fn with_voxel(mut self, voxel: f64) -> Self {
        self.voxel = voxel;
        self
    }

    /// Set the band half width.
    #[must_use]
    pub const fn with_band(mut self, band: f64) -> Self {
        self.band = band;
        self
    }

    /// Worst-case under-estimation of the true clearance: half the cell
    /// diagonal.
    #[must_use]
    pub fn eps(&self) -> f64 {
        3.0_f64.sqrt() / 2.0 * self.voxel
    }

    pub(crate) fn validate(&self) -> ClearanceResult<()> {
        if self.clearance < 0.0 {
            return Err(ClearanceError::InvalidParameter(format!(
                "clearance must be >= 0, got {}",
                self.clearance
            )));
        }
        if self.voxel <= 0.0 {
            return Err(ClearanceError::InvalidParameter(format!(
                "voxel must be > 0, got {}",
                self.voxel
            )));
        }
        if self.band <= 0.0 {
            return Err(ClearanceError::InvalidParameter(format!(
                "band must be > 0, got {}",
                self.band
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults_match_production_settings() {
        let sampling = SamplingParams::default();
        assert_eq!(sampling.samples, 120_000);
        let voxel = VoxelParams::default();
        assert_relative_eq!(voxel.voxel, 0.30);
        assert_relative_eq!(voxel.band, 8.0);
    }

    #[test]
    fn eps_is_half_cell_diagonal() {
        let params = VoxelParams::default().with_voxel(1.0);
        assert_relative_eq!(params.eps(), 3.0_f64.sqrt() / 2.0, epsilon = 1e-15);
    }

    #[test]
    fn negative_clearance_is_rejected() {
        let params = SamplingParams::default().with_clearance(-1.0);
        assert!(params.validate().is_err());
    }

    #[test]
    fn zero_samples_is_rejected() {
        let params = SamplingParams::default().with_samples(0);
        assert!(params.validate().is_err());
    }

    #[test]
    fn zero_voxel_is_rejected() {
        let params = VoxelParams::default().with_voxel(0.0);
        assert!(params.validate().is_err());
    }
}
