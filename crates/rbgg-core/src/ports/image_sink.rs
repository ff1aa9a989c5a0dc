//! Image sink port for persisting flattened outputs.

use image::GrayImage;

use crate::domain::OutputPaths;
use crate::flatten::FlattenOutput;

/// Port for writing the images produced for one input.
pub trait ImageSink: Send + Sync {
    /// Persists the outputs for the image loaded from `source_path`.
    ///
    /// `gray` is the grayscale input as seen by the core; sinks may skip it.
    ///
    /// # Errors
    ///
    /// Returns an error if any output cannot be written.
    fn save(
        &self,
        source_path: &str,
        gray: &GrayImage,
        output: &FlattenOutput,
    ) -> anyhow::Result<OutputPaths>;
}
