//! Serializable views of the metric registry.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

/// Aggregates of one timer, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerStats {
    /// Number of recorded samples.
    pub count: u64,
    /// Sum of all samples.
    pub total_time: f64,
    /// Mean sample, zero when empty.
    pub mean: f64,
    /// Largest sample.
    pub max: f64,
}

impl TimerStats {
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn new(count: u64, total: Duration, max: Duration) -> Self {
        let total_time = millis(total);
        let mean = if count == 0 {
            0.0
        } else {
            total_time / count as f64
        };
        Self {
            count,
            total_time,
            mean,
            max: millis(max),
        }
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Full registry snapshot, grouped by meter kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    /// Counter name to cumulative value.
    pub counters: BTreeMap<String, u64>,
    /// Timer name to aggregates.
    pub timers: BTreeMap<String, TimerStats>,
    /// Gauge name to last observed value.
    pub gauges: BTreeMap<String, u64>,
    /// Capture time, milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// A single meter's value in the flattened domain view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// Counter or gauge value.
    Value(u64),
    /// Timer aggregates.
    Timer(TimerStats),
}

impl MetricsSnapshot {
    /// Flattens every meter whose name starts with `prefix` into one map.
    #[must_use]
    pub fn filtered(&self, prefix: &str) -> BTreeMap<String, MetricValue> {
        let counters = self
            .counters
            .iter()
            .map(|(name, v)| (name, MetricValue::Value(*v)));
        let gauges = self
            .gauges
            .iter()
            .map(|(name, v)| (name, MetricValue::Value(*v)));
        let timers = self
            .timers
            .iter()
            .map(|(name, stats)| (name, MetricValue::Timer(*stats)));

        counters
            .chain(gauges)
            .chain(timers)
            .filter(|(name, _)| name.starts_with(prefix))
            .map(|(name, value)| (name.clone(), value))
            .collect()
    }

    /// Value of the named counter, zero if absent.
    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    /// Value of the named gauge, if registered.
    #[must_use]
    pub fn gauge(&self, name: &str) -> Option<u64> {
        self.gauges.get(name).copied()
    }

    /// Aggregates of the named timer, if registered.
    #[must_use]
    pub fn timer(&self, name: &str) -> Option<TimerStats> {
        self.timers.get(name).copied()
    }
}

/// Acknowledgement returned by the reset operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResetAck {
    /// Human-readable outcome.
    pub message: String,
    /// RFC 3339 time of the request.
    pub timestamp: String,
}
