//! Flattening parameters and the per-image window geometry derived from them.

use serde::{Deserialize, Serialize};

use super::FlattenError;

/// Parameters for one flattening run.
///
/// Built and validated once at the outer boundary (CLI, config), then passed
/// by value into the core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlattenParams {
    /// Window side as a fraction of `sqrt(width * height)`, in `(0, 1]`.
    pub window_size_fraction: f64,
    /// Local percentile to estimate, in `(0, 1]`.
    pub percentile: f64,
    /// Brightness the local percentile is scaled to.
    pub target_brightness: u8,
    /// Sweep columns on the rayon pool instead of the calling thread.
    pub parallel: bool,
}

impl Default for FlattenParams {
    fn default() -> Self {
        Self {
            window_size_fraction: 0.05,
            percentile: 0.9,
            target_brightness: 240,
            parallel: true,
        }
    }
}

impl FlattenParams {
    /// Checks that both fractions lie in `(0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`FlattenError::InvalidWindowSize`] or
    /// [`FlattenError::InvalidPercentile`]. NaN is rejected.
    pub fn validate(&self) -> Result<(), FlattenError> {
        if !is_unit_fraction(self.window_size_fraction) {
            return Err(FlattenError::InvalidWindowSize(self.window_size_fraction));
        }
        if !is_unit_fraction(self.percentile) {
            return Err(FlattenError::InvalidPercentile(self.percentile));
        }
        Ok(())
    }
}

fn is_unit_fraction(value: f64) -> bool {
    value > 0.0 && value <= 1.0
}

/// Window radius and target percentile for a single image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowGeometry {
    radius: u32,
    percentile: f64,
}

impl WindowGeometry {
    /// Creates a geometry from an explicit radius.
    ///
    /// # Errors
    ///
    /// Fails on a zero radius or a percentile outside `(0, 1]`.
    pub fn new(radius: u32, percentile: f64) -> Result<Self, FlattenError> {
        if radius == 0 {
            return Err(FlattenError::ZeroRadius);
        }
        if !is_unit_fraction(percentile) {
            return Err(FlattenError::InvalidPercentile(percentile));
        }
        Ok(Self { radius, percentile })
    }

    /// Derives the geometry for a `width x height` image.
    ///
    /// The window side is `round(sqrt(width * height) * fraction)` and the
    /// radius is half of it. The radius is capped at the larger image
    /// dimension minus one; anything bigger covers the same pixels.
    ///
    /// # Errors
    ///
    /// Fails on an empty image, invalid parameters, or a window too small
    /// to have a non-zero radius.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn for_image(width: u32, height: u32, params: &FlattenParams) -> Result<Self, FlattenError> {
        if width == 0 || height == 0 {
            return Err(FlattenError::EmptyImage { width, height });
        }
        params.validate()?;

        let area = f64::from(width) * f64::from(height);
        // Safe: fraction <= 1, so side <= sqrt(u32::MAX^2) fits in u32
        let side = (area.sqrt() * params.window_size_fraction).round() as u32;
        let limit = width.max(height).saturating_sub(1).max(1);
        let radius = (side / 2).min(limit);

        Self::new(radius, params.percentile)
    }

    /// Half window side in pixels.
    #[must_use]
    pub const fn radius(&self) -> u32 {
        self.radius
    }

    /// Target percentile in `(0, 1]`.
    #[must_use]
    pub const fn percentile(&self) -> f64 {
        self.percentile
    }

    /// Full window side, `2r + 1`.
    #[must_use]
    pub const fn side(&self) -> u32 {
        2 * self.radius + 1
    }
}
