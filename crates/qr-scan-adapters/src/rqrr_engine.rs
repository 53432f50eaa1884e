//! QR detection engine backed by `rqrr`.

use qr_scan_core::{DecodedRaster, DetectionEngine, EngineError, Point, RawDetection};
use rqrr::PreparedImage;
use tracing::debug;

/// Default white border added around the raster before detection.
pub const DEFAULT_QUIET_ZONE: u32 = 8;

/// Detection engine using `rqrr`.
///
/// Each call copies the raster into a reusable scratch buffer padded with a
/// quiet zone, so symbols touching the image edge are still found. Reported
/// corners are mapped back into the unpadded raster.
pub struct RqrrEngine {
    quiet_zone: u32,
    scratch: Vec<u8>,
}

impl RqrrEngine {
    /// Creates an engine with the default quiet zone.
    #[must_use]
    pub fn new() -> Self {
        Self::with_quiet_zone(DEFAULT_QUIET_ZONE)
    }

    /// Creates an engine padding rasters by `quiet_zone` pixels per side.
    #[must_use]
    pub const fn with_quiet_zone(quiet_zone: u32) -> Self {
        Self {
            quiet_zone,
            scratch: Vec::new(),
        }
    }

    /// Fills the scratch buffer with the padded raster and returns its size.
    fn pad(&mut self, raster: &DecodedRaster) -> (usize, usize) {
        let (w, h) = (raster.width() as usize, raster.height() as usize);
        let pad = self.quiet_zone as usize;
        let (pw, ph) = (w + 2 * pad, h + 2 * pad);

        self.scratch.clear();
        self.scratch.resize(pw * ph, u8::MAX);
        for (y, row) in raster.pixels().chunks_exact(w).enumerate() {
            let start = (y + pad) * pw + pad;
            self.scratch[start..start + w].copy_from_slice(row);
        }

        (pw, ph)
    }

    fn unpad(&self, corner: rqrr::Point, raster: &DecodedRaster) -> Point {
        let offset = f64::from(self.quiet_zone);
        Point::new(
            (f64::from(corner.x) - offset).clamp(0.0, f64::from(raster.width())),
            (f64::from(corner.y) - offset).clamp(0.0, f64::from(raster.height())),
        )
    }
}

impl Default for RqrrEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionEngine for RqrrEngine {
    fn name(&self) -> &'static str {
        "rqrr"
    }

    fn process(&mut self, raster: &DecodedRaster) -> Result<Vec<RawDetection>, EngineError> {
        if raster.width() == 0 || raster.height() == 0 {
            return Ok(Vec::new());
        }

        let (pw, ph) = self.pad(raster);
        let scratch = std::mem::take(&mut self.scratch);
        let mut prepared = PreparedImage::prepare_from_greyscale(pw, ph, |x, y| scratch[y * pw + x]);
        let grids = prepared.detect_grids();

        let mut undecodable = 0usize;
        let mut detections = Vec::with_capacity(grids.len());
        for grid in &grids {
            match grid.decode() {
                Ok((_, content)) => {
                    let corners = grid.bounds.iter().map(|c| self.unpad(*c, raster)).collect();
                    detections.push(RawDetection::new(content, corners));
                }
                Err(e) => {
                    undecodable += 1;
                    debug!(error = ?e, "Skipping undecodable QR grid");
                }
            }
        }

        debug!(
            found = grids.len(),
            failed = undecodable,
            decoded = detections.len(),
            "rqrr scan finished"
        );
        drop(grids);
        drop(prepared);
        self.scratch = scratch;
        Ok(detections)
    }
}
