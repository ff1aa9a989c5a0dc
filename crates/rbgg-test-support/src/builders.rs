//! Synthetic image builders for testing.

use image::{DynamicImage, GrayImage, Luma, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rbgg_core::domain::ImageInfo;

/// Builder for creating synthetic test images.
///
/// Provides convenience methods for generating images with known
/// illumination (flat, vignetted, sloped) and known foreground content.
pub struct SyntheticImageBuilder;

impl SyntheticImageBuilder {
    // === Flat Images ===

    /// Creates a uniform gray image.
    #[must_use]
    pub fn uniform_gray(width: u32, height: u32, value: u8) -> ImageInfo {
        ImageInfo::new(
            "synthetic://uniform_gray",
            DynamicImage::ImageLuma8(Self::uniform_luma(width, height, value)),
        )
    }

    /// Uniform gray as a bare luma buffer.
    #[must_use]
    pub fn uniform_luma(width: u32, height: u32, value: u8) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([value]))
    }

    /// A `background` image with a single `spot` pixel at `(x, y)`.
    #[must_use]
    pub fn bright_spot(
        width: u32,
        height: u32,
        background: u8,
        spot: u8,
        x: u32,
        y: u32,
    ) -> GrayImage {
        let mut img = Self::uniform_luma(width, height, background);
        img.put_pixel(x, y, Luma([spot]));
        img
    }

    /// The 4x4 image of 100 with a 200 at (2, 2).
    #[must_use]
    pub fn bright_spot_4x4() -> GrayImage {
        Self::bright_spot(4, 4, 100, 200, 2, 2)
    }

    // === Illumination Gradients ===

    /// Radial falloff from `center` brightness in the middle to `edge` at
    /// the corners, like lens vignetting.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn vignette(width: u32, height: u32, center: u8, edge: u8) -> GrayImage {
        let cx = f64::from(width) / 2.0;
        let cy = f64::from(height) / 2.0;
        let max_dist = cx.hypot(cy).max(1.0);
        let center = f64::from(center);
        let edge = f64::from(edge);

        GrayImage::from_fn(width, height, |x, y| {
            let dist = (f64::from(x) + 0.5 - cx).hypot(f64::from(y) + 0.5 - cy);
            let t = (dist / max_dist).min(1.0);
            let val = (center + (edge - center) * t * t).round().clamp(0.0, 255.0);
            Luma([val as u8])
        })
    }

    /// Linear ramp from `left` to `right` across the width.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn horizontal_ramp(width: u32, height: u32, left: u8, right: u8) -> GrayImage {
        let span = f64::from(width.saturating_sub(1).max(1));
        let left = f64::from(left);
        let right = f64::from(right);
        GrayImage::from_fn(width, height, |x, _| {
            let val = (left + (right - left) * f64::from(x) / span).round();
            Luma([val.clamp(0.0, 255.0) as u8])
        })
    }

    /// Dark horizontal strokes over a vignetted page.
    ///
    /// Every fourth row band of `stroke` rows, inset by a margin, is drawn
    /// at a third of the local background, which keeps ink well below the
    /// 90th percentile of any reasonable window.
    #[must_use]
    pub fn text_on_gradient(width: u32, height: u32) -> GrayImage {
        let mut img = Self::vignette(width, height, 220, 120);
        let margin = width / 8;
        let stroke = 2;
        for y in 0..height {
            if (y / stroke) % 4 != 1 {
                continue;
            }
            for x in margin..width.saturating_sub(margin) {
                let bg = img.get_pixel(x, y).0[0];
                img.put_pixel(x, y, Luma([bg / 3]));
            }
        }
        img
    }

    // === Random Content ===

    /// Uniformly random intensities, reproducible from `seed`.
    #[must_use]
    pub fn noise(width: u32, height: u32, seed: u64) -> GrayImage {
        let mut rng = StdRng::seed_from_u64(seed);
        GrayImage::from_fn(width, height, |_, _| Luma([rng.gen::<u8>()]))
    }

    /// Random intensities restricted to `lo..=hi`, reproducible from `seed`.
    #[must_use]
    pub fn noise_in_range(width: u32, height: u32, lo: u8, hi: u8, seed: u64) -> GrayImage {
        let mut rng = StdRng::seed_from_u64(seed);
        GrayImage::from_fn(width, height, |_, _| Luma([rng.gen_range(lo..=hi)]))
    }

    // === Wrapped Images ===

    /// Wraps a luma buffer as an [`ImageInfo`] with a synthetic path.
    #[must_use]
    pub fn info(name: &str, img: GrayImage) -> ImageInfo {
        ImageInfo::new(format!("synthetic://{name}"), DynamicImage::ImageLuma8(img))
    }

    /// Creates an RGB color image.
    #[must_use]
    pub fn rgb_uniform(width: u32, height: u32, r: u8, g: u8, b: u8) -> ImageInfo {
        let img = RgbImage::from_fn(width, height, |_, _| image::Rgb([r, g, b]));
        ImageInfo::new("synthetic://rgb_uniform", DynamicImage::ImageRgb8(img))
    }
}
