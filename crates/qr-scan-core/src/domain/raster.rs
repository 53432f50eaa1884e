//! Decoded single-channel raster.

use image::GrayImage;

/// Grayscale raster produced by a [`RasterDecoder`](crate::ports::RasterDecoder).
///
/// Owned by exactly one request and dropped once detection has run.
#[derive(Debug, Clone)]
pub struct DecodedRaster {
    image: GrayImage,
    format: Option<&'static str>,
}

impl DecodedRaster {
    /// Wraps an already converted grayscale image.
    #[must_use]
    pub const fn new(image: GrayImage) -> Self {
        Self {
            image,
            format: None,
        }
    }

    /// Records the container format the raster was decoded from.
    #[must_use]
    pub const fn with_format(mut self, format: &'static str) -> Self {
        self.format = Some(format);
        self
    }

    /// Raster width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Raster height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Container format name (`png`, `jpeg`, ...), if known.
    #[must_use]
    pub const fn format(&self) -> Option<&'static str> {
        self.format
    }

    /// Row-major luma samples, one byte per pixel.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Luma value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the raster.
    #[must_use]
    pub fn luma(&self, x: u32, y: u32) -> u8 {
        self.image.get_pixel(x, y).0[0]
    }
}
