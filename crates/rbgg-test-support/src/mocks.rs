//! Mock implementations of core port traits.

use std::sync::{Arc, Mutex, PoisonError};

use image::GrayImage;
use rbgg_core::domain::{FlattenReport, ImageInfo, OutputPaths};
use rbgg_core::flatten::FlattenOutput;
use rbgg_core::ports::{ImageSink, ImageSource, ProgressEvent, ProgressSink, ResultOutput};

/// Mock implementation of `ImageSource` for testing.
///
/// Yields pre-built images and tracks iteration for assertions.
pub struct MockImageSource {
    images: Vec<ImageInfo>,
    iteration_count: Arc<Mutex<usize>>,
}

impl MockImageSource {
    /// Creates a new mock source with the given images.
    #[must_use]
    pub fn new(images: Vec<ImageInfo>) -> Self {
        Self {
            images,
            iteration_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates an empty mock source.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Returns the number of times the source has been iterated.
    #[must_use]
    pub fn iteration_count(&self) -> usize {
        *self
            .iteration_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ImageSource for MockImageSource {
    fn images(&self) -> Box<dyn Iterator<Item = anyhow::Result<ImageInfo>> + Send + '_> {
        let count = Arc::clone(&self.iteration_count);
        if let Ok(mut c) = count.lock() {
            *c += 1;
        }
        Box::new(self.images.iter().cloned().map(Ok))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.images.len())
    }
}

/// Mock implementation of `ResultOutput` for testing.
///
/// Captures reports for later assertions.
pub struct MockResultOutput {
    reports: Arc<Mutex<Vec<FlattenReport>>>,
    flush_count: Arc<Mutex<usize>>,
}

impl MockResultOutput {
    /// Creates a new mock output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reports: Arc::new(Mutex::new(Vec::new())),
            flush_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Returns all captured reports.
    #[must_use]
    pub fn reports(&self) -> Vec<FlattenReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of times `flush()` was called.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        *self
            .flush_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockResultOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultOutput for MockResultOutput {
    fn write(&self, report: &FlattenReport) -> anyhow::Result<()> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.clone());
        Ok(())
    }

    fn write_array(&self, reports: &[FlattenReport], _pretty: bool) -> anyhow::Result<()> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(reports);
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        if let Ok(mut c) = self.flush_count.lock() {
            *c += 1;
        }
        Ok(())
    }
}

/// One call to [`MockImageSink::save`].
#[derive(Debug, Clone)]
pub struct SavedImage {
    /// Source path the outputs belong to.
    pub source_path: String,
    /// Grayscale input handed to the sink.
    pub gray: GrayImage,
    /// Flattened image handed to the sink.
    pub flattened: GrayImage,
    /// Gradient image handed to the sink.
    pub gradient: GrayImage,
}

/// Mock implementation of `ImageSink` for testing.
///
/// Keeps every saved image in memory and can be told to fail for paths
/// containing a marker.
pub struct MockImageSink {
    saved: Arc<Mutex<Vec<SavedImage>>>,
    fail_on: Option<String>,
}

impl MockImageSink {
    /// Creates a sink that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self {
            saved: Arc::new(Mutex::new(Vec::new())),
            fail_on: None,
        }
    }

    /// Creates a sink that fails for source paths containing `marker`.
    #[must_use]
    pub fn failing_on(marker: impl Into<String>) -> Self {
        Self {
            fail_on: Some(marker.into()),
            ..Self::new()
        }
    }

    /// Returns all saved images.
    #[must_use]
    pub fn saved(&self) -> Vec<SavedImage> {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for MockImageSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageSink for MockImageSink {
    fn save(
        &self,
        source_path: &str,
        gray: &GrayImage,
        output: &FlattenOutput,
    ) -> anyhow::Result<OutputPaths> {
        if let Some(marker) = &self.fail_on {
            if source_path.contains(marker.as_str()) {
                anyhow::bail!("mock sink refused {source_path}");
            }
        }

        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SavedImage {
                source_path: source_path.to_string(),
                gray: gray.clone(),
                flattened: output.flattened.clone(),
                gradient: output.gradient.clone(),
            });

        Ok(OutputPaths {
            gray: Some(format!("{source_path}.gray.png")),
            flattened: format!("{source_path}.rbgg.png"),
            gradient: format!("{source_path}.grad.png"),
        })
    }
}

/// Mock implementation of `ProgressSink` for testing.
///
/// Captures events for later assertions.
pub struct MockProgressSink {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl MockProgressSink {
    /// Creates a new mock progress sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of `Started` events.
    #[must_use]
    pub fn started_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Started { .. }))
            .count()
    }

    /// Returns the number of `Completed` events.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Completed { .. }))
            .count()
    }

    /// Returns the number of `Skipped` events.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Skipped { .. }))
            .count()
    }

    /// Returns whether a `Finished` event was received.
    #[must_use]
    pub fn has_finished(&self) -> bool {
        self.events()
            .iter()
            .any(|e| matches!(e, ProgressEvent::Finished { .. }))
    }

    /// Returns the final counts from the `Finished` event, if any.
    #[must_use]
    pub fn finished_counts(&self) -> Option<(usize, usize)> {
        self.events().iter().find_map(|e| match e {
            ProgressEvent::Finished { processed, skipped } => Some((*processed, *skipped)),
            _ => None,
        })
    }
}

impl Default for MockProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rbgg_core::domain::{FieldStats, ImageDimensions};
    use rbgg_core::{FlattenParams, Flattener};

    fn report(path: &str) -> FlattenReport {
        FlattenReport {
            path: path.into(),
            timestamp: "2024-01-01T00:00:00Z".into(),
            dimensions: ImageDimensions::new(100, 100),
            radius: 2,
            percentile: 0.9,
            target_brightness: 240,
            field: FieldStats {
                min: 100,
                max: 200,
                mean: 150.0,
            },
            outputs: OutputPaths::default(),
            elapsed_ms: 3,
        }
    }

    #[test]
    fn test_mock_image_source_empty() {
        let source = MockImageSource::empty();
        assert_eq!(source.count_hint(), Some(0));
        assert_eq!(source.images().count(), 0);
        assert_eq!(source.iteration_count(), 1);
    }

    #[test]
    fn test_mock_image_source_with_images() {
        let img = image::DynamicImage::new_rgb8(100, 100);
        let info = ImageInfo::new("test.png", img);
        let source = MockImageSource::new(vec![info]);

        assert_eq!(source.count_hint(), Some(1));
        assert_eq!(source.images().count(), 1);
    }

    #[test]
    fn test_mock_result_output() {
        let output = MockResultOutput::new();

        output.write(&report("test.png")).unwrap();
        output
            .write_array(&[report("a.png"), report("b.png")], false)
            .unwrap();
        output.flush().unwrap();

        assert_eq!(output.reports().len(), 3);
        assert_eq!(output.reports()[0].path, "test.png");
        assert_eq!(output.flush_count(), 1);
    }

    #[test]
    fn test_mock_image_sink() {
        let gray = crate::SyntheticImageBuilder::uniform_luma(64, 64, 90);
        let output = Flattener::new(FlattenParams::default())
            .unwrap()
            .flatten(&gray)
            .unwrap();

        let sink = MockImageSink::failing_on("bad");
        let paths = sink.save("page.png", &gray, &output).unwrap();
        assert_eq!(paths.flattened, "page.png.rbgg.png");
        assert!(sink.save("bad.png", &gray, &output).is_err());

        let saved = sink.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].source_path, "page.png");
        assert_eq!(saved[0].flattened.dimensions(), (64, 64));
    }

    #[test]
    fn test_mock_progress_sink() {
        let sink = MockProgressSink::new();

        sink.on_event(ProgressEvent::Started {
            path: "test.png".into(),
            index: 0,
            total: Some(1),
        });
        sink.on_event(ProgressEvent::Completed {
            report: report("test.png"),
        });
        sink.on_event(ProgressEvent::Finished {
            processed: 1,
            skipped: 0,
        });

        assert_eq!(sink.started_count(), 1);
        assert_eq!(sink.completed_count(), 1);
        assert!(sink.has_finished());
        assert_eq!(sink.finished_counts(), Some((1, 0)));
    }
}
