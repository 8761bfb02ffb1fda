//! Parameters for the batch drivers.

use fit_registration::AlignParams;

/// Parameters for [`batch_align_and_check`](crate::batch_align_and_check).
#[derive(Debug, Clone, Copy)]
pub struct BatchParams {
    /// Alignment pipeline knobs (voxel, FPFH radius, ICP gate).
    pub align: AlignParams,

    /// Required clearance in mesh units.
    pub clearance: f64,

    /// Safety margin added to the clearance in the pass rule.
    pub safety_delta: f64,

    /// Surface samples per clearance evaluation.
    pub samples: usize,

    /// Worker count; `<= 0` means one worker per core.
    pub threads: i32,

    /// Skip candidates failing the Steiner volume bound before alignment.
    pub prefilter: bool,
}

impl Default for BatchParams {
    fn default() -> Self {
        Self {
            align: AlignParams::default(),
            clearance: 2.0,
            safety_delta: 0.3,
            samples: 120_000,
            threads: -1,
            prefilter: false,
        }
    }
}

impl BatchParams {
    /// Set the alignment knobs.
    #[must_use]
    pub const fn with_align(mut self, align: AlignParams) -> Self {
        self.align = align;
        self
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

    /// Set the worker count (`<= 0` for auto).
    #[must_use]
    pub const fn with_threads(mut self, threads: i32) -> Self {
        self.threads = threads;
        self
    }

    /// Enable the coarse volume prefilter.
    #[must_use]
    pub const fn with_prefilter(mut self, prefilter: bool) -> Self {
        self.prefilter = prefilter;
        self
    }
}

/// Parameters for [`batch_formal_check`](crate::batch_formal_check).
#[derive(Debug, Clone, Copy)]
pub struct FormalCheckParams {
    /// Required clearance in mesh units.
    pub clearance: f64,

    /// Voxel edge length of the verification grid.
    pub voxel: f64,

    /// Narrow-band half width around the target surface.
    pub band: f64,

    /// Worker count; `<= 0` means one worker per core.
    pub threads: i32,
}

impl Default for FormalCheckParams {
    fn default() -> Self {
        Self {
            clearance: 2.0,
            voxel: 0.30,
            band: 8.0,
            threads: -1,
        }
    }
}

impl FormalCheckParams {
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

    /// Set the worker count (`<= 0` for auto).
    #[must_use]
    pub const fn with_threads(mut self, threads: i32) -> Self {
        self.threads = threads;
        self
    }
}
