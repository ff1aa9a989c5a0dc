//! Image and report types exchanged with the adapters.

use serde::{Deserialize, Serialize};

/// Per-image summary written to the result output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlattenReport {
    /// Path to the source image.
    pub path: String,
    /// Timestamp of processing (ISO 8601).
    pub timestamp: String,
    /// Image dimensions.
    pub dimensions: ImageDimensions,
    /// Window radius used for the percentile field.
    pub radius: u32,
    /// Percentile estimated in each window.
    pub percentile: f64,
    /// Brightness the local percentile was scaled to.
    pub target_brightness: u8,
    /// Statistics of the estimated gradient field.
    pub field: FieldStats,
    /// Files written for this image.
    pub outputs: OutputPaths,
    /// Wall time spent estimating and normalizing, in milliseconds.
    pub elapsed_ms: u64,
}

/// Summary statistics of a percentile field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldStats {
    /// Darkest local estimate.
    pub min: u8,
    /// Brightest local estimate.
    pub max: u8,
    /// Mean local estimate.
    pub mean: f64,
}

/// Output files produced for one image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputPaths {
    /// Grayscale copy of the input, if written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gray: Option<String>,
    /// Flattened image.
    pub flattened: String,
    /// Gradient field visualization.
    pub gradient: String,
}

/// Image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageDimensions {
    /// Creates new dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A decoded image and where it came from.
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Path to the image file.
    pub path: String,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Decoded image data.
    pub image: image::DynamicImage,
}

impl ImageInfo {
    /// Wraps a decoded image, taking dimensions from it.
    #[must_use]
    pub fn new(path: impl Into<String>, image: image::DynamicImage) -> Self {
        Self {
            path: path.into(),
            width: image.width(),
            height: image.height(),
            image,
        }
    }

    /// Converts the image to 8-bit luma.
    #[must_use]
    pub fn to_luma8(&self) -> image::GrayImage {
        self.image.to_luma8()
    }

    /// Returns the dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> ImageDimensions {
        ImageDimensions::new(self.width, self.height)
    }
}
