//! qr-scan core: domain types, ports, metrics and the detection pipeline.
//!
//! Image decoding and the QR detection engine live behind the
//! [`RasterDecoder`] and [`DetectionEngine`] ports; concrete adapters are in
//! `qr-scan-adapters`.

pub mod domain;
pub mod metrics;
pub mod pipeline;
pub mod ports;

pub use domain::{
    is_admitted_type, BoundingBox, DecodeError, DecodedRaster, DetectionResult, EngineError,
    HealthStatus, ImageUpload, Point, ProcessingTiming, QrCodeInfo, RawDetection, ScanReport,
    SkippedInput,
};
pub use metrics::{MetricsRecorder, MetricsSnapshot};
pub use pipeline::{DetectionOrchestrator, EnginePool};
pub use ports::{
    DetectionEngine, ImageSource, ProgressEvent, ProgressSink, RasterDecoder, ResultOutput,
};
