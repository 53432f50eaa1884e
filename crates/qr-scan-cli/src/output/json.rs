//! JSON output adapter.

use anyhow::Result;
use qr_scan_core::{ResultOutput, ScanReport};
use serde::Serialize;
use std::io::{self, Write};
use std::sync::Mutex;

/// JSON Lines output adapter.
pub struct JsonOutput {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonOutput {
    /// Creates a new JSON output writing to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Creates a new JSON output writing to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Writes a batch of reports as a JSON array.
    pub fn write_array(&self, reports: &[ScanReport], pretty: bool) -> Result<()> {
        self.write_document(reports, pretty)
    }

    /// Writes any serializable document on its own line.
    #[allow(clippy::significant_drop_tightening)]
    pub fn write_document<T: Serialize + ?Sized>(&self, document: &T, pretty: bool) -> Result<()> {
        let json = if pretty {
            serde_json::to_string_pretty(document)?
        } else {
            serde_json::to_string(document)?
        };
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writeln!(writer, "{json}")?;
        Ok(())
    }
}

impl ResultOutput for JsonOutput {
    fn write(&self, report: &ScanReport) -> Result<()> {
        self.write_document(report, false)
    }

    #[allow(clippy::significant_drop_tightening)]
    fn flush(&self) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writer.flush()?;
        Ok(())
    }
}
