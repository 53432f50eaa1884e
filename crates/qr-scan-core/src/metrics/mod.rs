//! Process-wide detection metrics.
//!
//! Counters only ever grow. [`MetricsRecorder::reset`] is accepted and
//! acknowledged but changes nothing: cumulative counters cannot be reset
//! under these semantics, and callers should diff snapshots instead.

mod meters;
mod snapshot;

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use meters::{Counter, Gauge, Timer};

pub use meters::TimerSample;
pub use snapshot::{MetricValue, MetricsSnapshot, ResetAck, TimerStats};

/// Prefix shared by every meter this crate registers.
pub const DOMAIN_PREFIX: &str = "qrcode.";

/// Metric names.
pub mod names {
    /// Requests started.
    pub const REQUESTS: &str = "qrcode.detection.requests.total";
    /// Requests that produced a success result.
    pub const SUCCESSES: &str = "qrcode.detection.success.total";
    /// Requests that produced a failure result.
    pub const FAILURES: &str = "qrcode.detection.failed.total";
    /// QR codes detected across all requests.
    pub const DETECTED: &str = "qrcode.detected.total";
    /// Raster decoding stage.
    pub const IMAGE_LOAD_DURATION: &str = "qrcode.image.load.duration";
    /// Detection engine stage.
    pub const DETECTION_DURATION: &str = "qrcode.detection.duration";
    /// Whole request.
    pub const TOTAL_DURATION: &str = "qrcode.processing.total.duration";
    /// Last upload size.
    pub const FILE_SIZE: &str = "qrcode.image.size.bytes";
    /// Last raster width.
    pub const IMAGE_WIDTH: &str = "qrcode.image.width.pixels";
    /// Last raster height.
    pub const IMAGE_HEIGHT: &str = "qrcode.image.height.pixels";
}

/// Pipeline stage measured by a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Raster decoding.
    ImageLoad,
    /// Detection engine call.
    Detection,
    /// Whole request.
    Total,
}

/// The full meter set, created together on first access.
struct Meters {
    requests: Counter,
    successes: Counter,
    failures: Counter,
    detected: Counter,
    image_load: Timer,
    detection: Timer,
    total: Timer,
    file_size: Gauge,
    image_width: Gauge,
    image_height: Gauge,
}

impl Meters {
    fn register() -> Self {
        let meters = Self {
            requests: Counter::new(names::REQUESTS, "Total number of QR code detection requests"),
            successes: Counter::new(
                names::SUCCESSES,
                "Total number of successful QR code detections",
            ),
            failures: Counter::new(names::FAILURES, "Total number of failed QR code detections"),
            detected: Counter::new(names::DETECTED, "Total number of QR codes detected"),
            image_load: Timer::new(
                names::IMAGE_LOAD_DURATION,
                "Time taken to load and parse image",
            ),
            detection: Timer::new(names::DETECTION_DURATION, "Time taken to detect QR codes"),
            total: Timer::new(
                names::TOTAL_DURATION,
                "Total time taken to process QR code detection request",
            ),
            file_size: Gauge::new(names::FILE_SIZE, "Size of the last submitted image"),
            image_width: Gauge::new(names::IMAGE_WIDTH, "Width of the last decoded image"),
            image_height: Gauge::new(names::IMAGE_HEIGHT, "Height of the last decoded image"),
        };

        for (name, description) in meters.descriptions() {
            debug!(name, description, "Registered meter");
        }
        meters
    }

    fn descriptions(&self) -> Vec<(&'static str, &'static str)> {
        let counters = [&self.requests, &self.successes, &self.failures, &self.detected]
            .map(|c| (c.name, c.description));
        let timers = [&self.image_load, &self.detection, &self.total].map(|t| (t.name, t.description));
        let gauges = [&self.file_size, &self.image_width, &self.image_height]
            .map(|g| (g.name, g.description));
        counters.into_iter().chain(timers).chain(gauges).collect()
    }

    const fn timer(&self, stage: Stage) -> &Timer {
        match stage {
            Stage::ImageLoad => &self.image_load,
            Stage::Detection => &self.detection,
            Stage::Total => &self.total,
        }
    }
}

/// Thread-safe registry of the pipeline's counters, timers and gauges.
///
/// The meter set is created lazily, exactly once, on first use. Use
/// [`MetricsRecorder::global`] for the process-wide instance.
pub struct MetricsRecorder {
    meters: OnceLock<Meters>,
}

static GLOBAL: OnceLock<Arc<MetricsRecorder>> = OnceLock::new();

impl MetricsRecorder {
    /// Creates an independent, not yet initialized recorder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            meters: OnceLock::new(),
        }
    }

    /// Returns the process-wide recorder.
    #[must_use]
    pub fn global() -> Arc<Self> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::new())))
    }

    fn meters(&self) -> &Meters {
        self.meters.get_or_init(Meters::register)
    }

    #[cfg(test)]
    fn is_initialized(&self) -> bool {
        self.meters.get().is_some()
    }

    /// Counts a started request.
    pub fn increment_requests(&self) {
        self.meters().requests.increment(1);
    }

    /// Counts a successful request.
    pub fn increment_successes(&self) {
        self.meters().successes.increment(1);
    }

    /// Counts a failed request.
    pub fn increment_failures(&self) {
        self.meters().failures.increment(1);
    }

    /// Adds `count` to the detected-codes total.
    pub fn add_detected(&self, count: usize) {
        self.meters()
            .detected
            .increment(u64::try_from(count).unwrap_or(u64::MAX));
    }

    /// Starts measuring `stage`.
    pub fn start_timer(&self, stage: Stage) -> TimerSample<'_> {
        TimerSample::start(self.meters().timer(stage))
    }

    /// Records the size of the latest upload.
    pub fn record_file_size(&self, bytes: u64) {
        self.meters().file_size.set(bytes);
    }

    /// Records the dimensions of the latest decoded raster.
    pub fn record_dimensions(&self, width: u32, height: u32) {
        let meters = self.meters();
        meters.image_width.set(u64::from(width));
        meters.image_height.set(u64::from(height));
    }

    /// Captures every meter.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let m = self.meters();

        let counters = [&m.requests, &m.successes, &m.failures, &m.detected]
            .into_iter()
            .map(|c| (c.name.to_string(), c.count()))
            .collect();
        let timers = [&m.image_load, &m.detection, &m.total]
            .into_iter()
            .map(|t| {
                (
                    t.name.to_string(),
                    TimerStats::new(t.count(), t.total(), t.max()),
                )
            })
            .collect();
        let gauges = [&m.file_size, &m.image_width, &m.image_height]
            .into_iter()
            .map(|g| (g.name.to_string(), g.value()))
            .collect();

        MetricsSnapshot {
            counters,
            timers,
            gauges,
            timestamp: epoch_millis(),
        }
    }

    /// Flattened view of the meters named with [`DOMAIN_PREFIX`].
    #[must_use]
    pub fn domain_view(&self) -> BTreeMap<String, MetricValue> {
        self.snapshot().filtered(DOMAIN_PREFIX)
    }

    /// Acknowledges a reset request without touching any meter.
    #[must_use]
    pub fn reset(&self) -> ResetAck {
        debug!("Metrics reset requested; counters are cumulative and left unchanged");
        ResetAck {
            message: "Metrics reset operation completed (note: counters cannot be reset)"
                .to_string(),
            timestamp: iso_timestamp(),
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

fn epoch_millis() -> i64 {
    let nanos = time::OffsetDateTime::now_utc().unix_timestamp_nanos();
    i64::try_from(nanos / 1_000_000).unwrap_or(i64::MAX)
}

/// Generate ISO 8601 UTC timestamp (RFC 3339 format).
fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}
