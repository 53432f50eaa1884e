//! Corner points and axis-aligned envelopes.

use serde::{Deserialize, Serialize};

/// A point in raster pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate (column).
    pub x: f64,
    /// Y coordinate (row).
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned envelope of a detected polygon.
///
/// The original corner polygon is always kept alongside the envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge (minimum corner x).
    pub x: f64,
    /// Top edge (minimum corner y).
    pub y: f64,
    /// Width (maximum corner x minus `x`).
    pub width: f64,
    /// Height (maximum corner y minus `y`).
    pub height: f64,
    /// Corner polygon in detection order.
    pub corners: Vec<Point>,
}

impl BoundingBox {
    /// Computes the envelope over every corner of `corners`.
    ///
    /// An empty polygon yields a zero-sized box at the origin.
    #[must_use]
    pub fn from_corners(corners: Vec<Point>) -> Self {
        if corners.is_empty() {
            return Self {
                x: 0.0,
                y: 0.0,
                width: 0.0,
                height: 0.0,
                corners,
            };
        }

        let (min_x, min_y, max_x, max_y) = corners.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(min_x, min_y, max_x, max_y), p| {
                (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y))
            },
        );

        Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
            corners,
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_of_axis_aligned_square() {
        let bbox = BoundingBox::from_corners(vec![
            Point::new(10.0, 20.0),
            Point::new(50.0, 20.0),
            Point::new(50.0, 60.0),
            Point::new(10.0, 60.0),
        ]);

        assert_eq!(bbox.x, 10.0);
        assert_eq!(bbox.y, 20.0);
        assert_eq!(bbox.width, 40.0);
        assert_eq!(bbox.height, 40.0);
        assert_eq!(bbox.corners.len(), 4);
    }

    #[test]
    fn test_envelope_of_rotated_quad() {
        // Diamond: extremes come from different corners on each axis
        let bbox = BoundingBox::from_corners(vec![
            Point::new(30.0, 5.0),
            Point::new(55.0, 30.0),
            Point::new(30.0, 55.0),
            Point::new(5.0, 30.0),
        ]);

        assert_eq!(bbox.x, 5.0);
        assert_eq!(bbox.y, 5.0);
        assert_eq!(bbox.width, 50.0);
        assert_eq!(bbox.height, 50.0);
    }

    #[test]
    fn test_envelope_preserves_corner_order() {
        let corners = vec![
            Point::new(3.0, 1.0),
            Point::new(1.0, 4.0),
            Point::new(5.0, 9.0),
        ];
        let bbox = BoundingBox::from_corners(corners.clone());
        assert_eq!(bbox.corners, corners);
        assert_eq!(bbox.width, 4.0);
        assert_eq!(bbox.height, 8.0);
    }

    #[test]
    fn test_empty_polygon() {
        let bbox = BoundingBox::from_corners(Vec::new());
        assert_eq!(bbox.width, 0.0);
        assert_eq!(bbox.height, 0.0);
        assert!(bbox.corners.is_empty());
    }
}
