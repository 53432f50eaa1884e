//! Mock implementations of core port traits.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use qr_scan_core::domain::{
    DecodeError, DecodedRaster, EngineError, ImageUpload, Point, RawDetection, ScanReport,
    SkippedInput,
};
use qr_scan_core::ports::{
    DetectionEngine, ImageSource, ProgressEvent, ProgressSink, RasterDecoder, ResultOutput,
};

/// Engine returning a fixed list of detections on every call.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEngine {
    detections: Vec<RawDetection>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedEngine {
    /// Creates an engine that always reports `detections`.
    #[must_use]
    pub fn new(detections: Vec<RawDetection>) -> Self {
        Self {
            detections,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Creates an engine that never finds anything.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// A detection with an axis-aligned square polygon.
    #[must_use]
    pub fn square(content: &str, x: f64, y: f64, side: f64) -> RawDetection {
        RawDetection::new(
            content,
            vec![
                Point::new(x, y),
                Point::new(x + side, y),
                Point::new(x + side, y + side),
                Point::new(x, y + side),
            ],
        )
    }

    /// Shared call counter; clones of this engine count into the same total.
    #[must_use]
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl DetectionEngine for ScriptedEngine {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn process(&mut self, _: &DecodedRaster) -> Result<Vec<RawDetection>, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.detections.clone())
    }
}

/// Engine that always reports a failure.
#[derive(Debug, Clone)]
pub struct FailingEngine {
    reason: String,
}

impl FailingEngine {
    /// Creates an engine failing with `reason`.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl DetectionEngine for FailingEngine {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn process(&mut self, _: &DecodedRaster) -> Result<Vec<RawDetection>, EngineError> {
        Err(EngineError::failed("failing", self.reason.clone()))
    }
}

/// Engine that panics on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanickingEngine;

impl DetectionEngine for PanickingEngine {
    fn name(&self) -> &'static str {
        "panicking"
    }

    fn process(&mut self, _: &DecodedRaster) -> Result<Vec<RawDetection>, EngineError> {
        panic!("detector state corrupted")
    }
}

/// Decoder that panics on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanickingDecoder;

impl RasterDecoder for PanickingDecoder {
    fn decode(&self, _: &[u8]) -> Result<DecodedRaster, DecodeError> {
        panic!("decoder state corrupted")
    }
}

/// Engine that records overlapping calls across every instance sharing its
/// probe state.
///
/// Each call reports one detection whose content is the raster's
/// `"{width}x{height}"`, so callers can check that a result belongs to the
/// raster they submitted.
#[derive(Debug, Clone)]
pub struct ReentrancyProbeEngine {
    busy: Arc<AtomicBool>,
    overlaps: Arc<AtomicUsize>,
    hold: Duration,
}

impl ReentrancyProbeEngine {
    /// Creates a probe that holds each call for `hold`.
    #[must_use]
    pub fn new(hold: Duration) -> Self {
        Self {
            busy: Arc::new(AtomicBool::new(false)),
            overlaps: Arc::new(AtomicUsize::new(0)),
            hold,
        }
    }

    /// Number of calls that started while another was still running.
    #[must_use]
    pub fn overlaps(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }
}

impl DetectionEngine for ReentrancyProbeEngine {
    fn name(&self) -> &'static str {
        "reentrancy-probe"
    }

    fn process(&mut self, raster: &DecodedRaster) -> Result<Vec<RawDetection>, EngineError> {
        if self.busy.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        thread::sleep(self.hold);
        let content = format!("{}x{}", raster.width(), raster.height());
        self.busy.store(false, Ordering::SeqCst);

        Ok(vec![ScriptedEngine::square(&content, 0.0, 0.0, 1.0)])
    }
}

/// Mock implementation of `ImageSource` for testing.
///
/// Yields pre-built uploads and tracks iteration for assertions.
pub struct MockImageSource {
    uploads: Vec<ImageUpload>,
    skipped: Vec<(String, String)>,
    iteration_count: Arc<Mutex<usize>>,
}

impl MockImageSource {
    /// Creates a new mock source with the given uploads.
    #[must_use]
    pub fn new(uploads: Vec<ImageUpload>) -> Self {
        Self {
            uploads,
            skipped: Vec::new(),
            iteration_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates an empty mock source.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Appends an input the source rejects as skipped.
    #[must_use]
    pub fn with_skipped(mut self, path: impl Into<String>, reason: impl Into<String>) -> Self {
        self.skipped.push((path.into(), reason.into()));
        self
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
    fn uploads(&self) -> Box<dyn Iterator<Item = anyhow::Result<ImageUpload>> + Send + '_> {
        *self
            .iteration_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;

        let skipped = self
            .skipped
            .iter()
            .map(|(path, reason)| Err(SkippedInput::new(path.as_str(), reason.as_str()).into()));
        Box::new(self.uploads.iter().cloned().map(Ok).chain(skipped))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.uploads.len() + self.skipped.len())
    }
}

/// Mock implementation of `ResultOutput` for testing.
///
/// Captures reports for later assertions.
pub struct MockResultOutput {
    reports: Arc<Mutex<Vec<ScanReport>>>,
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
    pub fn reports(&self) -> Vec<ScanReport> {
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
    fn write(&self, report: &ScanReport) -> anyhow::Result<()> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.clone());
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        *self
            .flush_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
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
        self.count(|e| matches!(e, ProgressEvent::Started { .. }))
    }

    /// Returns the number of `Completed` events.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Completed { .. }))
    }

    /// Returns the number of `Skipped` events.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Skipped { .. }))
    }

    /// Returns the `(processed, skipped, failed)` counts of the `Finished` event.
    #[must_use]
    pub fn finished_counts(&self) -> Option<(usize, usize, usize)> {
        self.events().iter().find_map(|e| match e {
            ProgressEvent::Finished {
                processed,
                skipped,
                failed,
            } => Some((*processed, *skipped, *failed)),
            _ => None,
        })
    }

    fn count(&self, pred: impl Fn(&ProgressEvent) -> bool) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| pred(e))
            .count()
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
    use image::GrayImage;
    use qr_scan_core::domain::{DetectionResult, ProcessingTiming};

    fn raster(w: u32, h: u32) -> DecodedRaster {
        DecodedRaster::new(GrayImage::new(w, h))
    }

    #[test]
    fn test_scripted_engine_counts_calls() {
        let mut engine = ScriptedEngine::new(vec![ScriptedEngine::square("a", 0.0, 0.0, 2.0)]);
        let calls = engine.calls();
        assert_eq!(engine.process(&raster(1, 1)).unwrap().len(), 1);
        assert_eq!(engine.clone().process(&raster(1, 1)).unwrap().len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failing_engine() {
        let err = FailingEngine::new("boom").process(&raster(1, 1)).unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_panicking_decoder() {
        let outcome = std::panic::catch_unwind(|| PanickingDecoder.decode(b"png"));
        assert!(outcome.is_err());
    }

    #[test]
    fn test_probe_echoes_dimensions() {
        let mut probe = ReentrancyProbeEngine::new(Duration::ZERO);
        let detections = probe.process(&raster(12, 7)).unwrap();
        assert_eq!(detections[0].content, "12x7");
        assert_eq!(probe.overlaps(), 0);
    }

    #[test]
    fn test_mock_image_source() {
        let source = MockImageSource::new(vec![ImageUpload::new("a.png", vec![1, 2])])
            .with_skipped("b.png", "unreadable");

        assert_eq!(source.count_hint(), Some(2));
        let items: Vec<_> = source.uploads().collect();
        assert!(items[0].is_ok());
        let err = items[1].as_ref().unwrap_err();
        assert_eq!(err.downcast_ref::<SkippedInput>().unwrap().path, "b.png");
        assert_eq!(source.iteration_count(), 1);
    }

    #[test]
    fn test_mock_result_output() {
        let output = MockResultOutput::new();
        let report = ScanReport {
            path: "test.png".into(),
            result: DetectionResult::success(vec![], ProcessingTiming::default()),
        };

        output.write(&report).unwrap();
        output.flush().unwrap();

        assert_eq!(output.reports().len(), 1);
        assert_eq!(output.reports()[0].path, "test.png");
        assert_eq!(output.flush_count(), 1);
    }

    #[test]
    fn test_mock_progress_sink() {
        let sink = MockProgressSink::new();

        sink.on_event(ProgressEvent::Started {
            path: "test.png".into(),
            index: 0,
            total: Some(1),
        });
        sink.on_event(ProgressEvent::Finished {
            processed: 1,
            skipped: 0,
            failed: 0,
        });

        assert_eq!(sink.started_count(), 1);
        assert_eq!(sink.finished_counts(), Some((1, 0, 0)));
    }
}
