//! Detection result types.

use serde::{Deserialize, Serialize, Serializer};

use super::QrCodeInfo;

/// Per-request timing telemetry.
///
/// Stage fields are `None` when the request failed before that stage was
/// measured. The serialized form also carries the derived
/// `formattedFileSize` and, once dimensions are known, `totalPixels`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingTiming {
    /// Wall-clock time of the whole request.
    pub total_time_ms: u64,
    /// Time spent decoding the raster.
    pub image_load_time_ms: Option<u64>,
    /// Time spent inside the detection engine.
    pub detection_time_ms: Option<u64>,
    /// Size of the submitted bytes.
    pub file_size_bytes: u64,
    /// Raster width, once decoded.
    pub image_width: Option<u32>,
    /// Raster height, once decoded.
    pub image_height: Option<u32>,
    /// Container format sniffed from the bytes.
    pub image_format: Option<String>,
}

impl ProcessingTiming {
    /// Starts timing for a request of `file_size_bytes`.
    #[must_use]
    pub fn for_upload(file_size_bytes: u64) -> Self {
        Self {
            file_size_bytes,
            ..Self::default()
        }
    }

    /// Sum of the measured stage durations.
    #[must_use]
    pub fn stage_time_ms(&self) -> u64 {
        self.image_load_time_ms.unwrap_or(0) + self.detection_time_ms.unwrap_or(0)
    }

    /// File size formatted as `B`, `KB` or `MB`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn formatted_file_size(&self) -> String {
        let bytes = self.file_size_bytes;
        if bytes < 1024 {
            format!("{bytes} B")
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }

    /// Total pixel count, once the raster dimensions are known.
    #[must_use]
    pub fn total_pixels(&self) -> Option<u64> {
        match (self.image_width, self.image_height) {
            (Some(w), Some(h)) => Some(u64::from(w) * u64::from(h)),
            _ => None,
        }
    }
}

/// Wire form of [`ProcessingTiming`], with the derived fields filled in.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessingTimingProxy<'a> {
    total_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_load_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detection_time_ms: Option<u64>,
    file_size_bytes: u64,
    formatted_file_size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_pixels: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_format: Option<&'a str>,
}

impl Serialize for ProcessingTiming {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let proxy = ProcessingTimingProxy {
            total_time_ms: self.total_time_ms,
            image_load_time_ms: self.image_load_time_ms,
            detection_time_ms: self.detection_time_ms,
            file_size_bytes: self.file_size_bytes,
            formatted_file_size: self.formatted_file_size(),
            image_width: self.image_width,
            image_height: self.image_height,
            total_pixels: self.total_pixels(),
            image_format: self.image_format.as_deref(),
        };
        proxy.serialize(serializer)
    }
}

/// Outcome of one detection request.
///
/// `qr_codes` is present on success (possibly empty) and absent on failure;
/// `count` always equals its length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    qr_codes: Option<Vec<QrCodeInfo>>,
    processing_time: ProcessingTiming,
}

impl DetectionResult {
    /// Successful result; `count` is derived from `qr_codes`.
    #[must_use]
    pub fn success(qr_codes: Vec<QrCodeInfo>, processing_time: ProcessingTiming) -> Self {
        Self {
            success: true,
            message: None,
            count: qr_codes.len(),
            qr_codes: Some(qr_codes),
            processing_time,
        }
    }

    /// Failed result carrying `message`.
    #[must_use]
    pub fn failure(message: impl Into<String>, processing_time: ProcessingTiming) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            count: 0,
            qr_codes: None,
            processing_time,
        }
    }

    /// Whether the pipeline completed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.success
    }

    /// Failure message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Number of detected codes.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Detected codes in engine order; empty on failure.
    #[must_use]
    pub fn qr_codes(&self) -> &[QrCodeInfo] {
        self.qr_codes.as_deref().unwrap_or_default()
    }

    /// Timing telemetry.
    #[must_use]
    pub const fn processing_time(&self) -> &ProcessingTiming {
        &self.processing_time
    }
}

/// A detection result labelled with the upload it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Path or name of the upload.
    pub path: String,
    /// Result document for that upload.
    #[serde(flatten)]
    pub result: DetectionResult,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::{BoundingBox, Point};

    fn code(content: &str) -> QrCodeInfo {
        QrCodeInfo {
            content: content.into(),
            bounding_box: BoundingBox::from_corners(vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 10.0),
            ]),
            confidence: 0.95,
        }
    }

    #[test]
    fn test_success_count_matches_codes() {
        let result = DetectionResult::success(vec![code("a"), code("b")], ProcessingTiming::default());
        assert!(result.is_success());
        assert_eq!(result.count(), 2);
        assert_eq!(result.qr_codes().len(), 2);
        assert!(result.message().is_none());
    }

    #[test]
    fn test_success_json_shape() {
        let timing = ProcessingTiming {
            total_time_ms: 12,
            image_load_time_ms: Some(4),
            detection_time_ms: Some(7),
            file_size_bytes: 2048,
            image_width: Some(640),
            image_height: Some(480),
            image_format: Some("png".into()),
        };
        let result = DetectionResult::success(vec![code("hello")], timing);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["count"], 1);
        assert!(json.get("message").is_none());
        assert_eq!(json["qrCodes"][0]["content"], "hello");
        assert_eq!(json["qrCodes"][0]["boundingBox"]["width"], 10.0);
        assert_eq!(json["qrCodes"][0]["boundingBox"]["corners"][2]["x"], 10.0);
        assert_eq!(json["processingTime"]["totalTimeMs"], 12);
        assert_eq!(json["processingTime"]["imageLoadTimeMs"], 4);
        assert_eq!(json["processingTime"]["detectionTimeMs"], 7);
        assert_eq!(json["processingTime"]["fileSizeBytes"], 2048);
        assert_eq!(json["processingTime"]["imageWidth"], 640);
        assert_eq!(json["processingTime"]["imageHeight"], 480);
        assert_eq!(json["processingTime"]["imageFormat"], "png");
        assert_eq!(json["processingTime"]["formattedFileSize"], "2.0 KB");
        assert_eq!(json["processingTime"]["totalPixels"], 640 * 480);
    }

    #[test]
    fn test_empty_success_keeps_empty_array() {
        let result = DetectionResult::success(vec![], ProcessingTiming::default());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["count"], 0);
        assert_eq!(json["qrCodes"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_failure_omits_codes_and_unmeasured_timing() {
        let result = DetectionResult::failure("Unable to read image", ProcessingTiming::for_upload(9));
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Unable to read image");
        assert!(json.get("qrCodes").is_none());
        assert_eq!(json["processingTime"]["fileSizeBytes"], 9);
        assert!(json["processingTime"].get("detectionTimeMs").is_none());
        assert!(json["processingTime"].get("imageWidth").is_none());
        assert!(json["processingTime"].get("totalPixels").is_none());
        assert_eq!(json["processingTime"]["formattedFileSize"], "9 B");
    }

    #[test]
    fn test_timing_reads_back_ignoring_derived_fields() {
        let timing = ProcessingTiming {
            total_time_ms: 3,
            file_size_bytes: 100,
            image_width: Some(2),
            image_height: Some(3),
            ..ProcessingTiming::default()
        };
        let json = serde_json::to_string(&timing).unwrap();
        let parsed: ProcessingTiming = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, timing);
    }

    #[test]
    fn test_report_flattens_result() {
        let report = ScanReport {
            path: "a.png".into(),
            result: DetectionResult::success(vec![code("x")], ProcessingTiming::default()),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["path"], "a.png");
        assert_eq!(json["success"], true);
        assert_eq!(json["qrCodes"][0]["content"], "x");
    }

    #[test]
    fn test_formatted_file_size() {
        assert_eq!(ProcessingTiming::for_upload(512).formatted_file_size(), "512 B");
        assert_eq!(ProcessingTiming::for_upload(1536).formatted_file_size(), "1.5 KB");
        assert_eq!(
            ProcessingTiming::for_upload(3 * 1024 * 1024).formatted_file_size(),
            "3.0 MB"
        );
    }

    #[test]
    fn test_total_pixels() {
        let mut timing = ProcessingTiming::default();
        assert_eq!(timing.total_pixels(), None);
        timing.image_width = Some(100);
        timing.image_height = Some(50);
        assert_eq!(timing.total_pixels(), Some(5000));
    }
}
