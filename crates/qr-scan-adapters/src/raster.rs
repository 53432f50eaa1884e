//! Raster decoding with the `image` crate.

use std::io::Cursor;

use image::{ImageError, ImageFormat, ImageReader, Limits};
use qr_scan_core::{DecodeError, DecodedRaster, RasterDecoder};
use tracing::debug;

/// Resource limits applied while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderLimits {
    /// Maximum accepted width in pixels.
    pub max_image_width: Option<u32>,
    /// Maximum accepted height in pixels.
    pub max_image_height: Option<u32>,
    /// Maximum bytes the decoder may allocate.
    pub max_alloc: Option<u64>,
}

impl Default for DecoderLimits {
    fn default() -> Self {
        Self {
            max_image_width: None,
            max_image_height: None,
            max_alloc: Some(512 * 1024 * 1024),
        }
    }
}

impl DecoderLimits {
    fn to_image_limits(self) -> Limits {
        let mut limits = Limits::default();
        limits.max_image_width = self.max_image_width;
        limits.max_image_height = self.max_image_height;
        limits.max_alloc = self.max_alloc;
        limits
    }
}

/// Decodes JPEG, PNG, GIF, BMP and WEBP into grayscale rasters.
///
/// The container is sniffed from the bytes; nothing the caller declares
/// about the content type is consulted.
#[derive(Debug, Clone, Default)]
pub struct ImageRasterDecoder {
    limits: DecoderLimits,
}

impl ImageRasterDecoder {
    /// Creates a decoder with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a decoder enforcing `limits`.
    #[must_use]
    pub const fn with_limits(limits: DecoderLimits) -> Self {
        Self { limits }
    }
}

impl RasterDecoder for ImageRasterDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedRaster, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Corrupt("empty input".into()));
        }

        let format = image::guess_format(bytes)
            .map_err(|_| DecodeError::Unsupported("unrecognized image format".into()))?;
        let name = format_name(format)
            .ok_or_else(|| DecodeError::Unsupported(format!("{format:?} images are not supported")))?;

        let mut reader = ImageReader::with_format(Cursor::new(bytes), format);
        reader.limits(self.limits.to_image_limits());
        let image = reader.decode().map_err(classify)?;

        // Consumes the full-color image; only the luma plane survives
        let gray = image.into_luma8();
        debug!(
            format = name,
            width = gray.width(),
            height = gray.height(),
            "Decoded raster"
        );

        Ok(DecodedRaster::new(gray).with_format(name))
    }
}

/// Lowercase name of a supported container format.
#[must_use]
pub const fn format_name(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("png"),
        ImageFormat::Jpeg => Some("jpeg"),
        ImageFormat::Gif => Some("gif"),
        ImageFormat::Bmp => Some("bmp"),
        ImageFormat::WebP => Some("webp"),
        _ => None,
    }
}

fn classify(err: ImageError) -> DecodeError {
    match err {
        ImageError::Limits(e) => DecodeError::Unsupported(e.to_string()),
        ImageError::Unsupported(e) => DecodeError::Unsupported(e.to_string()),
        other => DecodeError::Corrupt(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_corrupt() {
        let err = ImageRasterDecoder::new().decode(&[]);
        assert!(matches!(err, Err(DecodeError::Corrupt(_))));
    }

    #[test]
    fn test_text_is_unsupported() {
        let err = ImageRasterDecoder::new().decode(b"definitely not an image");
        assert!(matches!(err, Err(DecodeError::Unsupported(_))));
    }

    #[test]
    fn test_tiff_magic_is_unsupported() {
        let err = ImageRasterDecoder::new().decode(b"II*\0\x08\0\0\0garbage");
        assert!(matches!(err, Err(DecodeError::Unsupported(msg)) if msg.contains("Tiff")));
    }

    #[test]
    fn test_truncated_png_is_corrupt() {
        let err = ImageRasterDecoder::new().decode(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR");
        assert!(matches!(err, Err(DecodeError::Corrupt(_))));
    }

    #[test]
    fn test_format_names() {
        assert_eq!(format_name(ImageFormat::Jpeg), Some("jpeg"));
        assert_eq!(format_name(ImageFormat::WebP), Some("webp"));
        assert_eq!(format_name(ImageFormat::Tiff), None);
    }
}
