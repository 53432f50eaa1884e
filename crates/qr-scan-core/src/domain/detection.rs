//! Raw engine detections and their mapped, reportable form.

use serde::{Deserialize, Serialize};

use super::{BoundingBox, Point};

/// One located and text-decoded QR symbol, before geometric post-processing.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    /// Decoded text content.
    pub content: String,
    /// Corner polygon in raster pixel coordinates, in engine order.
    pub corners: Vec<Point>,
}

impl RawDetection {
    /// Creates a raw detection.
    pub fn new(content: impl Into<String>, corners: Vec<Point>) -> Self {
        Self {
            content: content.into(),
            corners,
        }
    }
}

/// A detected QR code as reported to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeInfo {
    /// Decoded text content.
    pub content: String,
    /// Envelope plus original corner polygon.
    pub bounding_box: BoundingBox,
    /// Coarse quality proxy in `[0, 1]`.
    pub confidence: f64,
}
