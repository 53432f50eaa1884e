//! qr-scan adapters: concrete implementations of the core ports.
//!
//! This crate provides adapters for:
//! - Raster decoding with the `image` crate
//! - QR detection with `rqrr`
//! - Filesystem image source

pub mod fs;
pub mod raster;
pub mod rqrr_engine;

pub use fs::FsImageSource;
pub use raster::{DecoderLimits, ImageRasterDecoder};
pub use rqrr_engine::{RqrrEngine, DEFAULT_QUIET_ZONE};
