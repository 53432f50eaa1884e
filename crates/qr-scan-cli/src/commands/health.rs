//! Health command - print the liveness document.

use anyhow::Result;
use qr_scan_core::HealthStatus;

use crate::output::JsonOutput;

/// Print the health document. Never touches the detection pipeline.
pub fn run() -> Result<()> {
    JsonOutput::stdout().write_document(&HealthStatus::current(), false)
}
