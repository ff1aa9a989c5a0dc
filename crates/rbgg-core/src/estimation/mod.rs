//! Local-percentile estimation: the sliding histogram and the column sweep
//! built on it.

mod field;
mod histogram;

pub use field::{compute_percentile_field, PercentileField, PercentileFieldComputer};
pub use histogram::{HistogramWindow, BINS};
