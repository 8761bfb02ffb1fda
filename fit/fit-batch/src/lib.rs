//! Batch driver: run the matching pipeline over a candidate library.
//!
//! [`batch_align_and_check`] takes one target and many candidate blanks,
//! and for each candidate independently aligns it (mirror-aware), applies
//! the winning transform, and screens the clearance by surface sampling.
//! [`batch_formal_check`] composes the voxel narrow-band verifier over the
//! list instead. Both drivers:
//!
//! - run candidates on a bounded rayon pool (`threads <= 0` means one
//!   worker per core)
//! - preserve input order: slot `i` of the output is candidate `i`,
//!   whatever the completion order
//! - isolate failures: an error in one candidate becomes a `Failed` slot,
//!   never an aborted batch
//!
//! # Example
//!
//! ```no_run
//! use fit_types::centered_cube;
//! use fit_batch::{batch_align_and_check, BatchParams};
//!
//! let target = centered_cube(1.0);
//! let candidates = vec![centered_cube(1.4), centered_cube(1.05)];
//! let reports = batch_align_and_check(&target, &candidates, &BatchParams::default()).unwrap();
//! assert_eq!(reports.len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod driver;
mod error;
mod params;
mod report;

pub use driver::{batch_align_and_check, batch_formal_check, rank_passing};
pub use error::{BatchError, BatchResult};
pub use params::{BatchParams, FormalCheckParams};
pub use report::{CandidateReport, FormalReport, MatchRecord};
