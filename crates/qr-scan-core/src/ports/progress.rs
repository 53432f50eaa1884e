//! Progress reporting port for UI integration.

use crate::domain::ScanReport;

/// Events emitted during a batch scan.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Detection started for an upload.
    Started {
        /// Path of the upload.
        path: String,
        /// Index in the batch (0-based).
        index: usize,
        /// Total uploads in batch, if known.
        total: Option<usize>,
    },
    /// Detection finished for an upload, successfully or not.
    Completed {
        /// The report for the upload.
        report: ScanReport,
    },
    /// An upload was skipped before reaching the pipeline.
    Skipped {
        /// Path of the upload.
        path: String,
        /// Reason for skipping.
        reason: String,
    },
    /// All uploads have been handled.
    Finished {
        /// Uploads that went through the pipeline.
        processed: usize,
        /// Uploads skipped before the pipeline.
        skipped: usize,
        /// Processed uploads whose result was a failure.
        failed: usize,
    },
}

/// Port for receiving progress events.
pub trait ProgressSink: Send + Sync {
    /// Called when a progress event occurs.
    fn on_event(&self, event: ProgressEvent);
}
