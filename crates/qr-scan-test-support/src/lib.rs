//! Test support utilities for qr-scan.
//!
//! Provides port mocks, scripted detection engines, and builders for scenes
//! containing real QR symbols.
//!
//! # Example
//!
//! ```
//! use qr_scan_test_support::{QrSceneBuilder, ScriptedEngine};
//!
//! // Two symbols at known positions
//! let scene = QrSceneBuilder::new(320, 160)
//!     .symbol("left", 16, 16, 4)
//!     .symbol("right", 180, 16, 4)
//!     .build()
//!     .unwrap();
//! assert_eq!(scene.symbols.len(), 2);
//!
//! // An engine that skips detection entirely
//! let engine = ScriptedEngine::new(vec![ScriptedEngine::square("a", 0.0, 0.0, 10.0)]);
//! ```

mod builders;
mod mocks;

pub use builders::{encode, PlacedSymbol, QrScene, QrSceneBuilder, SyntheticImageBuilder};
pub use mocks::{
    FailingEngine, MockImageSource, MockProgressSink, MockResultOutput, PanickingDecoder,
    PanickingEngine, ReentrancyProbeEngine, ScriptedEngine,
};
