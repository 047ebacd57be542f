//! Directory-level batch processing.
//!
//! Each frame is loaded, processed and saved independently; recoverable per-frame failures are
//! collected in a [`BatchReport`](report::BatchReport) instead of aborting the run.

pub(crate) mod crop;
pub(crate) mod overlay;
pub(crate) mod report;
