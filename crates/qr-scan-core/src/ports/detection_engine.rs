//! Detection engine port.

use crate::domain::{DecodedRaster, EngineError, RawDetection};

/// Locates and decodes QR symbols in a raster.
///
/// # Threading contract
///
/// An engine keeps mutable per-call state while [`process`](Self::process)
/// runs and must never be entered twice at once. `&mut self` enforces this
/// per instance; sharing engines across requests goes through
/// [`EnginePool`](crate::pipeline::EnginePool).
///
/// Reported corners are in the coordinate space of the raster that was
/// passed in. An engine that rescales or reorients internally must map its
/// corners back, otherwise they diverge from the reported image dimensions.
pub trait DetectionEngine: Send {
    /// Returns the name of this engine.
    fn name(&self) -> &'static str;

    /// Detects QR codes in `raster`, in engine order.
    ///
    /// Returns an empty vector when the raster contains no QR code.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot process the input.
    fn process(&mut self, raster: &DecodedRaster) -> Result<Vec<RawDetection>, EngineError>;
}
