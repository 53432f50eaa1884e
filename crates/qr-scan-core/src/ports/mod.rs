//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the detection pipeline and external adapters.

mod detection_engine;
mod image_source;
mod progress;
mod raster_decoder;
mod result_output;

pub use detection_engine::DetectionEngine;
pub use image_source::ImageSource;
pub use progress::{ProgressEvent, ProgressSink};
pub use raster_decoder::RasterDecoder;
pub use result_output::ResultOutput;
