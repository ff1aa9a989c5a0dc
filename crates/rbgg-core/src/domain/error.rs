//! Errors raised at the boundary of the core.

use thiserror::Error;

/// Precondition failures detected before any estimation runs.
///
/// Histogram bookkeeping defects are not represented here; those are
/// assertion failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlattenError {
    /// The image has zero width or zero height.
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },

    /// The derived or requested window radius is zero.
    #[error("window radius is zero; increase the window size")]
    ZeroRadius,

    /// Percentile outside `(0, 1]`.
    #[error("percentile must be in (0, 1], got {0}")]
    InvalidPercentile(f64),

    /// Window size fraction outside `(0, 1]`.
    #[error("window size fraction must be in (0, 1], got {0}")]
    InvalidWindowSize(f64),

    /// Field and image dimensions disagree.
    #[error("field is {field_width}x{field_height} but image is {width}x{height}")]
    DimensionMismatch {
        /// Field width.
        field_width: u32,
        /// Field height.
        field_height: u32,
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
    },
}
