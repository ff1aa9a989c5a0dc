//! Rescales pixels against their local percentile.

use image::GrayImage;

use crate::domain::FlattenError;
use crate::estimation::PercentileField;

/// Divides each pixel by its local estimate and scales it to `target`.
///
/// `out = clamp(round(pixel / max(estimate, 1) * target), 0, 255)`. An
/// all-black window has an estimate of 0 and is divided by 1 instead.
///
/// # Errors
///
/// Returns [`FlattenError::DimensionMismatch`] if the field was computed
/// for an image of a different size.
pub fn normalize(
    image: &GrayImage,
    field: &PercentileField,
    target: u8,
) -> Result<GrayImage, FlattenError> {
    let (width, height) = image.dimensions();
    if (field.width(), field.height()) != (width, height) {
        return Err(FlattenError::DimensionMismatch {
            field_width: field.width(),
            field_height: field.height(),
            width,
            height,
        });
    }

    let values: Vec<u8> = image
        .as_raw()
        .iter()
        .zip(field.as_raw())
        .map(|(&pixel, &estimate)| scale_pixel(pixel, estimate, target))
        .collect();

    // Safe: one output value per input pixel
    Ok(GrayImage::from_raw(width, height, values)
        .unwrap_or_else(|| unreachable!("normalized buffer matches image dimensions")))
}

/// Scales a single pixel.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn scale_pixel(pixel: u8, estimate: u8, target: u8) -> u8 {
    let divisor = f64::from(estimate.max(1));
    let scaled = (f64::from(pixel) / divisor * f64::from(target)).round();
    // Safe: clamped to the u8 range first
    scaled.clamp(0.0, 255.0) as u8
}
