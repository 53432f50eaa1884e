//! Lock-free meter primitives.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Monotonic counter.
#[derive(Debug)]
pub(crate) struct Counter {
    pub(crate) name: &'static str,
    pub(crate) description: &'static str,
    value: AtomicU64,
}

impl Counter {
    pub(crate) const fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            value: AtomicU64::new(0),
        }
    }

    pub(crate) fn increment(&self, amount: u64) {
        self.value.fetch_add(amount, Ordering::Relaxed);
    }

    pub(crate) fn count(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Duration accumulator: sample count, total and maximum.
#[derive(Debug)]
pub(crate) struct Timer {
    pub(crate) name: &'static str,
    pub(crate) description: &'static str,
    count: AtomicU64,
    total_nanos: AtomicU64,
    max_nanos: AtomicU64,
}

impl Timer {
    pub(crate) const fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            count: AtomicU64::new(0),
            total_nanos: AtomicU64::new(0),
            max_nanos: AtomicU64::new(0),
        }
    }

    pub(crate) fn record(&self, elapsed: Duration) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.total_nanos.fetch_add(nanos, Ordering::Relaxed);
        self.max_nanos.fetch_max(nanos, Ordering::Relaxed);
    }

    pub(crate) fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub(crate) fn total(&self) -> Duration {
        Duration::from_nanos(self.total_nanos.load(Ordering::Relaxed))
    }

    pub(crate) fn max(&self) -> Duration {
        Duration::from_nanos(self.max_nanos.load(Ordering::Relaxed))
    }
}

/// Last-observed value; every write overwrites.
#[derive(Debug)]
pub(crate) struct Gauge {
    pub(crate) name: &'static str,
    pub(crate) description: &'static str,
    value: AtomicU64,
}

impl Gauge {
    pub(crate) const fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            value: AtomicU64::new(0),
        }
    }

    pub(crate) fn set(&self, value: u64) {
        self.value.store(value, Ordering::Relaxed);
    }

    pub(crate) fn value(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// A running measurement against one timer.
///
/// Recorded only when [`stop`](Self::stop) is called; dropping a sample
/// discards it.
#[must_use = "a timer sample records nothing unless stopped"]
#[derive(Debug)]
pub struct TimerSample<'a> {
    timer: &'a Timer,
    started: Instant,
}

impl<'a> TimerSample<'a> {
    pub(crate) fn start(timer: &'a Timer) -> Self {
        Self {
            timer,
            started: Instant::now(),
        }
    }

    /// Records the elapsed time into the timer and returns it.
    #[allow(clippy::must_use_candidate)]
    pub fn stop(self) -> Duration {
        let elapsed = self.started.elapsed();
        self.timer.record(elapsed);
        elapsed
    }
}
