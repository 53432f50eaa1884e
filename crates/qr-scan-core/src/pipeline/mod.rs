//! The detection pipeline and its shared resources.

mod engine_pool;
mod mapper;
mod orchestrator;

pub use engine_pool::{EngineFactory, EngineLease, EnginePool};
pub use mapper::{map_detection, FALLBACK_CONFIDENCE, FOUR_CORNER_CONFIDENCE};
pub use orchestrator::DetectionOrchestrator;

use std::any::Any;

/// Text of a caught panic payload.
fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
