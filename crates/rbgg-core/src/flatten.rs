//! Entry point tying geometry, estimation and normalization together.

use std::time::Instant;

use image::GrayImage;
use tracing::debug;

use crate::domain::{FieldStats, FlattenError, FlattenParams, WindowGeometry};
use crate::estimation::{HistogramWindow, PercentileFieldComputer};
use crate::normalize::normalize;

/// Everything produced for one image.
#[derive(Debug, Clone)]
pub struct FlattenOutput {
    /// Input rescaled against its local percentile.
    pub flattened: GrayImage,
    /// The percentile field rendered as an image.
    pub gradient: GrayImage,
    /// Geometry derived for this image.
    pub geometry: WindowGeometry,
    /// Statistics of the percentile field.
    pub field_stats: FieldStats,
}

/// Removes background gradients from grayscale images.
#[derive(Debug, Clone, Copy)]
pub struct Flattener {
    params: FlattenParams,
}

impl Flattener {
    /// Creates a flattener after validating `params`.
    ///
    /// # Errors
    ///
    /// Returns the validation error for out-of-range fractions.
    pub fn new(params: FlattenParams) -> Result<Self, FlattenError> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Returns the parameters.
    #[must_use]
    pub const fn params(&self) -> &FlattenParams {
        &self.params
    }

    /// Estimates the local percentile field of `image` and rescales it.
    ///
    /// # Errors
    ///
    /// Fails when the image is empty or too small for a non-zero radius.
    pub fn flatten(&self, image: &GrayImage) -> Result<FlattenOutput, FlattenError> {
        let (width, height) = image.dimensions();
        let geometry = WindowGeometry::for_image(width, height, &self.params)?;

        let start = Instant::now();
        let field = PercentileFieldComputer::new(geometry)
            .with_parallel(self.params.parallel)
            .compute(image)?;
        debug!(
            radius = geometry.radius(),
            elapsed_ms = start.elapsed().as_millis(),
            "Percentile field computed"
        );

        let flattened = normalize(image, &field, self.params.target_brightness)?;
        let gradient = field.into_image();
        let field_stats = HistogramWindow::from_luma(&gradient).stats();

        Ok(FlattenOutput {
            flattened,
            gradient,
            geometry,
            field_stats,
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::cast_possible_truncation)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_params() {
        let params = FlattenParams {
            percentile: 2.0,
            ..Default::default()
        };
        assert_eq!(
            Flattener::new(params).err(),
            Some(FlattenError::InvalidPercentile(2.0))
        );
    }

    #[test]
    fn test_flatten_removes_horizontal_ramp() {
        // Brightness ramps from 100 to 199 across the page
        let img = GrayImage::from_fn(100, 100, |x, _| image::Luma([100 + x as u8]));
        let params = FlattenParams {
            window_size_fraction: 0.1,
            percentile: 0.5,
            target_brightness: 200,
            parallel: true,
        };
        let output = Flattener::new(params)
            .expect("params")
            .flatten(&img)
            .expect("flatten");

        assert_eq!(output.geometry.radius(), 5);
        assert_eq!(output.gradient.dimensions(), (100, 100));
        // Interior pixels sit within a few levels of the target
        for x in 10..90 {
            let value = output.flattened.get_pixel(x, 50).0[0];
            assert!((195..=205).contains(&value), "x={x} value={value}");
        }
    }

    #[test]
    fn test_flatten_too_small_image() {
        let img = GrayImage::new(4, 4);
        let result = Flattener::new(FlattenParams::default())
            .expect("params")
            .flatten(&img);
        assert!(matches!(result, Err(FlattenError::ZeroRadius)));
    }

    #[test]
    fn test_flatten_reports_field_stats() {
        let img = GrayImage::from_fn(40, 40, |_, _| image::Luma([90]));
        let params = FlattenParams {
            window_size_fraction: 0.2,
            ..Default::default()
        };
        let output = Flattener::new(params)
            .expect("params")
            .flatten(&img)
            .expect("flatten");
        assert_eq!(output.field_stats.min, 90);
        assert_eq!(output.field_stats.max, 90);
        assert!(output.flattened.pixels().all(|p| p.0[0] == 240));
    }
}
