//! Metrics command - print the metric registry documents.

use anyhow::Result;
use clap::{Args, ValueEnum};
use qr_scan_core::MetricsRecorder;

use crate::output::JsonOutput;

/// Which meters a metrics document covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum MetricsScope {
    /// Every registered meter, grouped by kind
    #[default]
    All,
    /// Only `qrcode.*` meters, flattened by name
    Qrcode,
}

impl MetricsScope {
    /// Renders the document for this scope.
    pub fn render(self, recorder: &MetricsRecorder) -> Result<serde_json::Value> {
        let value = match self {
            Self::All => serde_json::to_value(recorder.snapshot())?,
            Self::Qrcode => serde_json::to_value(recorder.domain_view())?,
        };
        Ok(value)
    }
}

/// Arguments for the metrics command.
#[derive(Args, Clone, Default)]
pub struct MetricsArgs {
    /// Meters to include
    #[arg(long, value_enum, default_value_t)]
    pub scope: MetricsScope,

    /// Request a reset; counters are cumulative and stay unchanged
    #[arg(long)]
    pub reset: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Run the metrics command against this process's registry.
pub fn run(args: &MetricsArgs) -> Result<()> {
    let recorder = MetricsRecorder::global();
    let output = JsonOutput::stdout();

    if args.reset {
        output.write_document(&recorder.reset(), args.pretty)
    } else {
        output.write_document(&args.scope.render(&recorder)?, args.pretty)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use qr_scan_core::metrics::names;

    #[test]
    fn test_all_scope_groups_by_kind() {
        let recorder = MetricsRecorder::new();
        recorder.increment_requests();

        let doc = MetricsScope::All.render(&recorder).unwrap();
        assert_eq!(doc["counters"][names::REQUESTS], 1);
        assert!(doc["timers"][names::TOTAL_DURATION]["count"].is_u64());
        assert!(doc["gauges"].is_object());
        assert!(doc["timestamp"].is_i64());
    }

    #[test]
    fn test_qrcode_scope_is_flat() {
        let recorder = MetricsRecorder::new();
        recorder.add_detected(2);

        let doc = MetricsScope::Qrcode.render(&recorder).unwrap();
        let map = doc.as_object().unwrap();
        assert!(map.keys().all(|k| k.starts_with("qrcode.")));
        assert_eq!(doc[names::DETECTED], 2);
        assert!(doc[names::DETECTION_DURATION]["mean"].is_f64());
    }
}
