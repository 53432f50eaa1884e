//! Failure taxonomy of the detection pipeline.

use thiserror::Error;

/// Image bytes could not be turned into a raster.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The container was recognised but its contents are damaged or empty.
    #[error("corrupt image data: {0}")]
    Corrupt(String),
    /// The bytes are not in a supported container format, or exceed decoder limits.
    #[error("unsupported image: {0}")]
    Unsupported(String),
}

/// An input a source could not turn into an upload.
#[derive(Debug, Error)]
#[error("{reason}: {path}")]
pub struct SkippedInput {
    /// Path or name of the input.
    pub path: String,
    /// Why it was not admitted.
    pub reason: String,
}

impl SkippedInput {
    /// Builds a skip notice for `path`.
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Engine-internal fault while processing a raster.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine reported a failure for this input.
    #[error("{engine} failed: {reason}")]
    Failed {
        /// Name of the engine.
        engine: &'static str,
        /// Engine-provided reason.
        reason: String,
    },
    /// The engine panicked; the instance has been discarded.
    #[error("{engine} panicked: {reason}")]
    Panicked {
        /// Name of the engine.
        engine: &'static str,
        /// Panic payload, if it was a string.
        reason: String,
    },
}

impl EngineError {
    /// Builds a [`EngineError::Failed`] for `engine`.
    pub fn failed(engine: &'static str, reason: impl Into<String>) -> Self {
        Self::Failed {
            engine,
            reason: reason.into(),
        }
    }
}
