//! Result output port for writing scan reports.

use crate::domain::ScanReport;

/// Port for outputting scan reports.
pub trait ResultOutput: Send + Sync {
    /// Writes a single report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write(&self, report: &ScanReport) -> anyhow::Result<()>;

    /// Flushes any buffered output.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn flush(&self) -> anyhow::Result<()>;
}
