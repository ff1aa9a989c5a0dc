//! Per-pixel local percentile field computed by sliding a histogram down
//! every image column.

use image::GrayImage;
use rayon::prelude::*;
use tracing::debug;

use super::HistogramWindow;
use crate::domain::{FlattenError, WindowGeometry};

/// Local percentile estimate for every pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PercentileField {
    width: u32,
    height: u32,
    values: Vec<u8>,
}

impl PercentileField {
    /// Field width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Field height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Estimate at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the field.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        assert!(x < self.width && y < self.height, "({x}, {y}) outside field");
        self.values[y as usize * self.width as usize + x as usize]
    }

    /// Row-major estimates.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        &self.values
    }

    /// Gradient visualization: the field as a grayscale image.
    #[must_use]
    pub fn into_image(self) -> GrayImage {
        // Safe: values.len() == width * height by construction
        GrayImage::from_raw(self.width, self.height, self.values)
            .unwrap_or_else(|| unreachable!("field buffer matches its dimensions"))
    }
}

/// Computes a [`PercentileField`] for a given window geometry.
///
/// Each column `x` gets its own [`HistogramWindow`] over the strip of
/// columns `[x - r, x + r]` clipped to the image. The window is primed with
/// the first `r` rows, then slid down one row per output: the row `2r + 1`
/// above the incoming one leaves, the incoming row enters, and the
/// percentile is read for the row `r` above the incoming one. Every output
/// row `o` therefore sees rows `[o - r, o + r]` clipped to the image.
///
/// Columns share nothing but the read-only source, so they can run on the
/// rayon pool; the result is identical either way.
///
/// The window is a full `2r + 1` rows tall. Tools that drop the row `2r`
/// above the incoming one instead see only `2r` rows, so their fields
/// differ slightly from this one.
#[derive(Debug, Clone, Copy)]
pub struct PercentileFieldComputer {
    geometry: WindowGeometry,
    parallel: bool,
}

impl PercentileFieldComputer {
    /// Creates a computer that sweeps columns in parallel.
    #[must_use]
    pub const fn new(geometry: WindowGeometry) -> Self {
        Self {
            geometry,
            parallel: true,
        }
    }

    /// Chooses between the rayon pool and the calling thread.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Returns the geometry in use.
    #[must_use]
    pub const fn geometry(&self) -> WindowGeometry {
        self.geometry
    }

    /// Computes the field for `image`.
    ///
    /// # Errors
    ///
    /// Returns [`FlattenError::EmptyImage`] for a zero-area image.
    pub fn compute(&self, image: &GrayImage) -> Result<PercentileField, FlattenError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(FlattenError::EmptyImage { width, height });
        }

        let w = width as usize;
        let h = height as usize;
        let radius = self.geometry.radius() as usize;
        let p = self.geometry.percentile();

        debug!(
            width,
            height,
            radius,
            percentile = p,
            parallel = self.parallel,
            "Computing percentile field"
        );

        // Column-major scratch: each column sweep owns a disjoint chunk.
        let mut columns = vec![0u8; w * h];
        if self.parallel {
            columns
                .par_chunks_mut(h)
                .enumerate()
                .for_each(|(x, column)| sweep_column(image, x, radius, p, column));
        } else {
            columns
                .chunks_mut(h)
                .enumerate()
                .for_each(|(x, column)| sweep_column(image, x, radius, p, column));
        }

        let mut values = vec![0u8; w * h];
        for (x, column) in columns.chunks_exact(h).enumerate() {
            for (y, &value) in column.iter().enumerate() {
                values[y * w + x] = value;
            }
        }

        Ok(PercentileField {
            width,
            height,
            values,
        })
    }
}

/// Computes the field for an explicit radius and percentile on the rayon pool.
///
/// # Errors
///
/// Fails on a zero radius, a percentile outside `(0, 1]`, or an empty image.
pub fn compute_percentile_field(
    image: &GrayImage,
    radius: u32,
    percentile: f64,
) -> Result<PercentileField, FlattenError> {
    let geometry = WindowGeometry::new(radius, percentile)?;
    PercentileFieldComputer::new(geometry).compute(image)
}

/// Sweeps one column, writing `out[y]` for every row.
fn sweep_column(image: &GrayImage, x: usize, radius: usize, p: f64, out: &mut [u8]) {
    let width = image.width() as usize;
    let height = out.len();
    let pixels = image.as_raw();

    let x0 = x.saturating_sub(radius);
    let x1 = (x + radius + 1).min(width);
    let strip = |y: usize| &pixels[y * width + x0..y * width + x1];

    let mut window = HistogramWindow::new();
    for y in 0..radius.min(height) {
        window.add_all(strip(y));
    }

    for y in radius..height + radius {
        if let Some(leaving) = y.checked_sub(2 * radius + 1) {
            window.remove_all(strip(leaving));
        }
        if y < height {
            window.add_all(strip(y));
        }
        out[y - radius] = window.percentile(p);
    }
}
