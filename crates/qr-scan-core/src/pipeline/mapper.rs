//! Raw detection to reportable code.

use crate::domain::{BoundingBox, QrCodeInfo, RawDetection};

/// Confidence for a detection with a full quadrilateral.
pub const FOUR_CORNER_CONFIDENCE: f64 = 0.95;

/// Confidence for any other corner count.
pub const FALLBACK_CONFIDENCE: f64 = 0.70;

/// Maps a raw engine detection to a [`QrCodeInfo`].
///
/// The envelope covers every corner, and the polygon is kept as reported.
#[must_use]
pub fn map_detection(raw: RawDetection) -> QrCodeInfo {
    let confidence = if raw.corners.len() == 4 {
        FOUR_CORNER_CONFIDENCE
    } else {
        FALLBACK_CONFIDENCE
    };

    QrCodeInfo {
        content: raw.content,
        bounding_box: BoundingBox::from_corners(raw.corners),
        confidence,
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::domain::Point;

    fn corners(n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| {
                let i = f64::from(u32::try_from(i).unwrap_or(0));
                Point::new(i * 10.0, 100.0 - i * 5.0)
            })
            .collect()
    }

    #[test]
    fn test_four_corners_high_confidence() {
        let info = map_detection(RawDetection::new("hello", corners(4)));
        assert_eq!(info.confidence, FOUR_CORNER_CONFIDENCE);
        assert_eq!(info.content, "hello");
    }

    #[test]
    fn test_other_corner_counts_fallback_confidence() {
        for n in [0, 1, 3, 5, 8] {
            let info = map_detection(RawDetection::new("x", corners(n)));
            assert_eq!(info.confidence, FALLBACK_CONFIDENCE, "corner count {n}");
        }
    }

    #[test]
    fn test_envelope_and_polygon_preserved() {
        let polygon = vec![
            Point::new(12.5, 40.0),
            Point::new(80.0, 35.0),
            Point::new(85.0, 90.0),
            Point::new(10.0, 95.5),
        ];
        let info = map_detection(RawDetection::new("p", polygon.clone()));

        assert_eq!(info.bounding_box.x, 10.0);
        assert_eq!(info.bounding_box.y, 35.0);
        assert_eq!(info.bounding_box.width, 75.0);
        assert_eq!(info.bounding_box.height, 60.5);
        assert_eq!(info.bounding_box.corners, polygon);
    }
}
