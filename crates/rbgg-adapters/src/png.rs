//! PNG writer for flattened outputs.

use anyhow::{Context, Result};
use image::{GrayImage, ImageFormat};
use rbgg_core::{FlattenOutput, ImageSink, OutputPaths};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

/// Suffix of the grayscale copy of the input.
pub const GRAY_SUFFIX: &str = ".gray.png";
/// Suffix of the flattened image.
pub const FLATTENED_SUFFIX: &str = ".rbgg.png";
/// Suffix of the gradient field visualization.
pub const GRADIENT_SUFFIX: &str = ".grad.png";

/// Every suffix this sink writes.
pub const OUTPUT_SUFFIXES: &[&str] = &[GRAY_SUFFIX, FLATTENED_SUFFIX, GRADIENT_SUFFIX];

/// Writes `<stem>.gray.png`, `<stem>.rbgg.png` and `<stem>.grad.png`.
///
/// Outputs go next to the source image unless an output directory is set.
/// A sink never overwrites a file it wrote itself: two sources mapping to
/// the same output name (`a/page.png` and `b/page.png` into one output
/// directory, or `page.png` beside `page.jpg`) fail for the second source.
#[derive(Debug)]
pub struct PngImageSink {
    out_dir: Option<PathBuf>,
    write_gray: bool,
    claimed: Mutex<HashSet<PathBuf>>,
}

impl PngImageSink {
    /// Creates a sink writing next to each source, including the gray copy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            out_dir: None,
            write_gray: true,
            claimed: Mutex::new(HashSet::new()),
        }
    }

    /// Writes every output into `dir` instead, creating it on demand.
    #[must_use]
    pub fn with_out_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.out_dir = dir;
        self
    }

    /// Enables or disables the grayscale copy.
    #[must_use]
    pub const fn with_gray(mut self, write_gray: bool) -> Self {
        self.write_gray = write_gray;
        self
    }

    /// Output path for `source` with the given suffix.
    #[must_use]
    pub fn output_path(&self, source: &Path, suffix: &str) -> PathBuf {
        let stem = source
            .file_stem()
            .map_or_else(|| "image".into(), |s| s.to_string_lossy());
        let dir = self
            .out_dir
            .as_deref()
            .or_else(|| source.parent())
            .unwrap_or_else(|| Path::new(""));
        dir.join(format!("{stem}{suffix}"))
    }

    /// Reserves every output path of `source`, failing if an earlier source
    /// already holds one of them.
    fn claim(&self, source: &Path) -> Result<()> {
        let paths: Vec<PathBuf> = self
            .suffixes()
            .map(|suffix| self.output_path(source, suffix))
            .collect();

        let mut claimed = self.claimed.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(taken) = paths.iter().find(|p| claimed.contains(*p)) {
            warn!(
                source = %source.display(),
                output = %taken.display(),
                "Output name collision"
            );
            anyhow::bail!(
                "{} was already written for another input in this run",
                taken.display()
            );
        }
        claimed.extend(paths);
        Ok(())
    }

    fn suffixes(&self) -> impl Iterator<Item = &'static str> {
        let gray = self.write_gray.then_some(GRAY_SUFFIX);
        gray.into_iter().chain([FLATTENED_SUFFIX, GRADIENT_SUFFIX])
    }

    fn write(&self, source: &Path, suffix: &str, image: &GrayImage) -> Result<String> {
        let path = self.output_path(source, suffix);
        image
            .save_with_format(&path, ImageFormat::Png)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(path = %path.display(), "Wrote output");
        Ok(path.to_string_lossy().into_owned())
    }
}

impl Default for PngImageSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageSink for PngImageSink {
    fn save(
        &self,
        source_path: &str,
        gray: &GrayImage,
        output: &FlattenOutput,
    ) -> Result<OutputPaths> {
        if let Some(dir) = &self.out_dir {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        }

        let source = Path::new(source_path);
        self.claim(source)?;

        let gray = if self.write_gray {
            Some(self.write(source, GRAY_SUFFIX, gray)?)
        } else {
            None
        };

        Ok(OutputPaths {
            gray,
            flattened: self.write(source, FLATTENED_SUFFIX, &output.flattened)?,
            gradient: self.write(source, GRADIENT_SUFFIX, &output.gradient)?,
        })
    }
}
