//! Result output port for writing per-image reports.

use crate::domain::FlattenReport;

/// Port for outputting flattening reports.
pub trait ResultOutput: Send + Sync {
    /// Writes a single report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write(&self, report: &FlattenReport) -> anyhow::Result<()>;

    /// Writes a whole batch of reports at once.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_array(&self, reports: &[FlattenReport], pretty: bool) -> anyhow::Result<()>;

    /// Flushes any buffered output.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn flush(&self) -> anyhow::Result<()>;
}
