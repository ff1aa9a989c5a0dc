//! Brute-force reference for the local percentile.
//!
//! Sorts every clipped `(2r + 1) x (2r + 1)` neighborhood independently.
//! Quadratic in the radius and only meant as an oracle for the sliding
//! histogram.

use image::GrayImage;

/// Order statistic of `values` matching the histogram lookup.
///
/// Below or at the median the rank `max(floor(n * p), 1)` is counted from
/// the darkest sample, above it `max(floor(n * (1 - p)), 1)` is counted
/// from the brightest.
///
/// # Panics
///
/// Panics if `values` is empty.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn sorted_percentile(values: &[u8], p: f64) -> u8 {
    assert!(!values.is_empty(), "percentile of no samples");
    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let n = sorted.len();
    if p <= 0.5 {
        let k = ((n as f64 * p).floor() as usize).max(1);
        sorted[k - 1]
    } else {
        let k = ((n as f64 * (1.0 - p)).floor() as usize).max(1);
        sorted[n - k]
    }
}

/// Pixels of the neighborhood of `(x, y)` with radius `r`, clipped to the image.
#[must_use]
pub fn neighborhood(image: &GrayImage, x: u32, y: u32, r: u32) -> Vec<u8> {
    let x0 = x.saturating_sub(r);
    let y0 = y.saturating_sub(r);
    let x1 = x.saturating_add(r).min(image.width() - 1);
    let y1 = y.saturating_add(r).min(image.height() - 1);

    let mut values = Vec::with_capacity(((x1 - x0 + 1) * (y1 - y0 + 1)) as usize);
    for ny in y0..=y1 {
        for nx in x0..=x1 {
            values.push(image.get_pixel(nx, ny).0[0]);
        }
    }
    values
}

/// Local percentile at a single pixel.
#[must_use]
pub fn neighborhood_percentile(image: &GrayImage, x: u32, y: u32, r: u32, p: f64) -> u8 {
    sorted_percentile(&neighborhood(image, x, y, r), p)
}

/// Local percentile at every pixel, as an image.
#[must_use]
pub fn percentile_field(image: &GrayImage, r: u32, p: f64) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        image::Luma([neighborhood_percentile(image, x, y, r, p)])
    })
}
