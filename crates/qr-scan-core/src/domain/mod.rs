//! Core domain types for QR code detection.

mod detection;
mod error;
mod geometry;
mod health;
mod raster;
mod result;
mod upload;

pub use detection::{QrCodeInfo, RawDetection};
pub use error::{DecodeError, EngineError, SkippedInput};
pub use geometry::{BoundingBox, Point};
pub use health::HealthStatus;
pub use raster::DecodedRaster;
pub use result::{DetectionResult, ProcessingTiming, ScanReport};
pub use upload::{is_admitted_type, ImageUpload};
