//! Per-request detection pipeline: decode, detect, map, report.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::{map_detection, panic_reason, EnginePool};
use crate::domain::{
    DecodeError, DecodedRaster, DetectionResult, ImageUpload, ProcessingTiming, QrCodeInfo,
    ScanReport,
};
use crate::metrics::{MetricsRecorder, Stage, TimerSample};
use crate::ports::RasterDecoder;

/// Runs detection requests against a shared decoder and engine pool.
///
/// Every call returns a [`DetectionResult`]; failures are reported in the
/// result, never as errors or panics.
pub struct DetectionOrchestrator {
    decoder: Box<dyn RasterDecoder>,
    engines: EnginePool,
    metrics: Arc<MetricsRecorder>,
}

impl DetectionOrchestrator {
    /// Creates an orchestrator reporting to the process-wide recorder.
    #[must_use]
    pub fn new(decoder: Box<dyn RasterDecoder>, engines: EnginePool) -> Self {
        Self {
            decoder,
            engines,
            metrics: MetricsRecorder::global(),
        }
    }

    /// Reports to `metrics` instead of the process-wide recorder.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    /// The recorder this orchestrator reports to.
    #[must_use]
    pub const fn metrics(&self) -> &Arc<MetricsRecorder> {
        &self.metrics
    }

    /// The engine pool detection runs on.
    #[must_use]
    pub const fn engines(&self) -> &EnginePool {
        &self.engines
    }

    /// Detects QR codes in encoded image bytes.
    #[must_use]
    pub fn detect(&self, bytes: &[u8]) -> DetectionResult {
        let mut scope = RequestScope::begin(&self.metrics, bytes.len());

        let load = self.metrics.start_timer(Stage::ImageLoad);
        let decoded = self.decode(bytes);
        scope.timing.image_load_time_ms = Some(millis(load.stop()));

        match decoded {
            Ok(raster) => self.detect_decoded(scope, &raster),
            Err(e) => {
                warn!(error = %e, "Image decoding failed");
                scope.fail(format!("Unable to read image: {e}"))
            }
        }
    }

    /// Detects QR codes in an upload and labels the result with its path.
    #[must_use]
    pub fn detect_upload(&self, upload: &ImageUpload) -> ScanReport {
        debug!(path = %upload.path, bytes = upload.len(), "Processing upload");
        ScanReport {
            path: upload.path.clone(),
            result: self.detect(&upload.bytes),
        }
    }

    /// Detects QR codes in an already decoded raster.
    ///
    /// No load stage runs, so `imageLoadTimeMs` is zero and the file size is
    /// the raster's pixel byte count.
    #[must_use]
    pub fn detect_raster(&self, raster: &DecodedRaster) -> DetectionResult {
        let mut scope = RequestScope::begin(&self.metrics, raster.pixels().len());
        scope.timing.image_load_time_ms = Some(0);
        self.detect_decoded(scope, raster)
    }

    /// Runs the decoder, turning a panic into [`DecodeError::Corrupt`].
    fn decode(&self, bytes: &[u8]) -> Result<DecodedRaster, DecodeError> {
        panic::catch_unwind(AssertUnwindSafe(|| self.decoder.decode(bytes))).unwrap_or_else(
            |payload| {
                let reason = panic_reason(payload.as_ref());
                warn!(%reason, "Raster decoder panicked");
                Err(DecodeError::Corrupt(format!("decoder panicked: {reason}")))
            },
        )
    }

    fn detect_decoded(&self, mut scope: RequestScope<'_>, raster: &DecodedRaster) -> DetectionResult {
        let (width, height) = (raster.width(), raster.height());
        scope.timing.image_width = Some(width);
        scope.timing.image_height = Some(height);
        scope.timing.image_format = raster.format().map(str::to_string);
        self.metrics.record_dimensions(width, height);

        let detect = self.metrics.start_timer(Stage::Detection);
        let detections = match self.engines.run(raster) {
            Ok(detections) => detections,
            Err(e) => {
                // Sample dropped unrecorded; only completed engine calls are timed
                drop(detect);
                warn!(error = %e, "QR code detection failed");
                return scope.fail(format!("QR code detection failed: {e}"));
            }
        };
        scope.timing.detection_time_ms = Some(millis(detect.stop()));

        let codes: Vec<_> = detections
            .into_iter()
            .map(|raw| {
                let code = map_detection(raw);
                info!(
                    content = %code.content,
                    x = code.bounding_box.x,
                    y = code.bounding_box.y,
                    "Detected QR code"
                );
                code
            })
            .collect();

        scope.succeed(codes)
    }
}

/// Per-request metrics bookkeeping.
///
/// Opening a scope counts the request and starts the total timer. Closing it,
/// through [`succeed`](Self::succeed), [`fail`](Self::fail) or drop, stops
/// the total timer and counts the outcome, exactly once.
struct RequestScope<'a> {
    metrics: &'a MetricsRecorder,
    total: Option<TimerSample<'a>>,
    timing: ProcessingTiming,
}

impl<'a> RequestScope<'a> {
    fn begin(metrics: &'a MetricsRecorder, file_size: usize) -> Self {
        let file_size = u64::try_from(file_size).unwrap_or(u64::MAX);
        metrics.increment_requests();
        let total = metrics.start_timer(Stage::Total);
        metrics.record_file_size(file_size);
        Self {
            metrics,
            total: Some(total),
            timing: ProcessingTiming::for_upload(file_size),
        }
    }

    fn close(&mut self) -> Duration {
        self.total.take().map_or(Duration::ZERO, TimerSample::stop)
    }

    fn succeed(mut self, codes: Vec<QrCodeInfo>) -> DetectionResult {
        self.timing.total_time_ms = millis(self.close());
        self.metrics.increment_successes();
        self.metrics.add_detected(codes.len());
        debug!(
            count = codes.len(),
            total_ms = self.timing.total_time_ms,
            "Detection finished"
        );
        DetectionResult::success(codes, std::mem::take(&mut self.timing))
    }

    fn fail(mut self, message: String) -> DetectionResult {
        self.timing.total_time_ms = millis(self.close());
        self.metrics.increment_failures();
        DetectionResult::failure(message, std::mem::take(&mut self.timing))
    }
}

impl Drop for RequestScope<'_> {
    fn drop(&mut self) {
        // Still open only when unwinding past an unfinished request
        if self.total.is_some() {
            self.close();
            self.metrics.increment_failures();
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
