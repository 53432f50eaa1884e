//! Raster decoding port.

use crate::domain::{DecodeError, DecodedRaster};

/// Turns container bytes into a grayscale raster.
///
/// Implementations must sniff the format from the bytes themselves and never
/// panic on malformed input.
pub trait RasterDecoder: Send + Sync {
    /// Decodes `bytes` into a single-channel raster.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Unsupported`] for unrecognised containers and
    /// [`DecodeError::Corrupt`] for damaged data.
    fn decode(&self, bytes: &[u8]) -> Result<DecodedRaster, DecodeError>;
}
