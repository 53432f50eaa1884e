//! Bounded pool of non-reentrant detection engines.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, PoisonError};

use tracing::{debug, warn};

use super::panic_reason;
use crate::domain::{DecodedRaster, EngineError, RawDetection};
use crate::ports::DetectionEngine;

/// Builds fresh engine instances for the pool.
pub type EngineFactory = Arc<dyn Fn() -> Box<dyn DetectionEngine> + Send + Sync>;

/// A fixed set of engine instances shared by concurrent requests.
///
/// Each request checks out one instance exclusively and returns it when the
/// lease drops. With every instance leased, [`checkout`](Self::checkout)
/// blocks until one comes back. A capacity of one serializes all detection
/// on a single instance.
pub struct EnginePool {
    idle: Mutex<Vec<Box<dyn DetectionEngine>>>,
    available: Condvar,
    factory: EngineFactory,
    capacity: usize,
}

impl EnginePool {
    /// Creates a pool of `capacity` instances built by `factory`.
    ///
    /// A capacity of zero is raised to one.
    pub fn new<F>(capacity: usize, factory: F) -> Self
    where
        F: Fn() -> Box<dyn DetectionEngine> + Send + Sync + 'static,
    {
        let capacity = capacity.max(1);
        let factory: EngineFactory = Arc::new(factory);
        let idle: Vec<_> = (0..capacity).map(|_| factory()).collect();

        if let Some(engine) = idle.first() {
            debug!(engine = engine.name(), capacity, "Engine pool ready");
        }

        Self {
            idle: Mutex::new(idle),
            available: Condvar::new(),
            factory,
            capacity,
        }
    }

    /// Creates a pool holding a single instance.
    pub fn single<F>(factory: F) -> Self
    where
        F: Fn() -> Box<dyn DetectionEngine> + Send + Sync + 'static,
    {
        Self::new(1, factory)
    }

    /// Number of instances owned by the pool.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of instances not currently leased.
    #[must_use]
    pub fn idle_count(&self) -> usize {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Leases an instance, blocking until one is idle.
    pub fn checkout(&self) -> EngineLease<'_> {
        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(engine) = idle.pop() {
                return EngineLease {
                    pool: self,
                    engine: Some(engine),
                };
            }
            idle = self
                .available
                .wait(idle)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Runs one detection on a leased instance.
    ///
    /// # Errors
    ///
    /// Returns the engine's error, or [`EngineError::Panicked`] if it panicked.
    pub fn run(&self, raster: &DecodedRaster) -> Result<Vec<RawDetection>, EngineError> {
        self.checkout().process(raster)
    }

    fn release(&self, engine: Box<dyn DetectionEngine>) {
        self.idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(engine);
        self.available.notify_one();
    }
}

impl fmt::Debug for EnginePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnginePool")
            .field("capacity", &self.capacity)
            .field("idle", &self.idle_count())
            .finish_non_exhaustive()
    }
}

/// Exclusive use of one pooled engine; returned to the pool on drop.
pub struct EngineLease<'a> {
    pool: &'a EnginePool,
    engine: Option<Box<dyn DetectionEngine>>,
}

impl EngineLease<'_> {
    /// Runs the leased engine on `raster`.
    ///
    /// A panic inside the engine is caught; the instance is dropped and a
    /// fresh one from the pool's factory takes its place.
    ///
    /// # Errors
    ///
    /// Returns the engine's error, or [`EngineError::Panicked`] if it panicked.
    pub fn process(&mut self, raster: &DecodedRaster) -> Result<Vec<RawDetection>, EngineError> {
        let Some(engine) = self.engine.as_mut() else {
            return Err(EngineError::failed("engine-pool", "lease holds no engine"));
        };
        let name = engine.name();

        match panic::catch_unwind(AssertUnwindSafe(|| engine.process(raster))) {
            Ok(result) => result,
            Err(payload) => {
                let reason = panic_reason(payload.as_ref());
                warn!(engine = name, %reason, "Detection engine panicked, replacing instance");
                self.engine = Some((self.pool.factory)());
                Err(EngineError::Panicked {
                    engine: name,
                    reason,
                })
            }
        }
    }
}

impl Drop for EngineLease<'_> {
    fn drop(&mut self) {
        if let Some(engine) = self.engine.take() {
            self.pool.release(engine);
        }
    }
}
