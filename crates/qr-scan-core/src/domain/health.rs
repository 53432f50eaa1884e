//! Static health document.

use serde::Serialize;

/// Liveness document, independent of the detection pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    /// Always `"OK"`.
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
}

impl HealthStatus {
    /// Returns the health document.
    #[must_use]
    pub const fn current() -> Self {
        Self {
            status: "OK",
            service: "QR Code Detection Service",
        }
    }
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self::current()
    }
}
