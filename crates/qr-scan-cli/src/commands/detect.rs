//! Detect command - find and decode QR codes in images.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use qr_scan_adapters::{
    DecoderLimits, FsImageSource, ImageRasterDecoder, RqrrEngine, DEFAULT_QUIET_ZONE,
};
use qr_scan_core::{
    DetectionOrchestrator, EnginePool, ImageSource, ImageUpload, MetricsRecorder, ProgressEvent,
    ProgressSink, ResultOutput, ScanReport, SkippedInput,
};
use rayon::prelude::*;
use tracing::{debug, info};

use super::metrics::MetricsScope;
use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{JsonOutput, ProgressBar};

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON Lines (one JSON object per line)
    #[default]
    Jsonl,
    /// Single JSON array
    Json,
}

/// Hardcoded defaults for values neither the CLI nor config set.
mod defaults {
    pub const ENGINES: usize = 1;
    pub const MAX_ALLOC_MB: u64 = 512;
}

/// Parse a count that must be at least one.
fn parse_count(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid count"))?;
    if value == 0 {
        Err("must be at least 1".to_string())
    } else {
        Ok(value)
    }
}

/// Shared arguments for QR detection.
#[derive(Args, Clone, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct DetectArgs {
    /// Image files or directories to scan
    pub paths: Vec<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,

    /// Worker threads (defaults to the number of CPUs)
    #[arg(short, long, value_parser = parse_count)]
    pub jobs: Option<usize>,

    /// Detection engine instances shared by the workers
    #[arg(long, value_parser = parse_count)]
    pub engines: Option<usize>,

    /// Print the metrics snapshot to stderr after the batch
    #[arg(long)]
    pub metrics: bool,

    /// Meters included by --metrics
    #[arg(long, value_enum)]
    pub metrics_scope: Option<MetricsScope>,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Engine quiet zone in pixels (config only).
    #[arg(skip)]
    quiet_zone: Option<u32>,

    /// Decoder limits (config only).
    #[arg(skip)]
    limits: Option<DecoderLimits>,
}

impl DetectArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    ///
    /// Boolean flags can only be switched on by config; invalid config
    /// values are ignored.
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }

        args.jobs = args.jobs.or(config.general.jobs.filter(|n| *n >= 1));
        args.engines = args
            .engines
            .or(config.engine.instances.filter(|n| *n >= 1));
        args.quiet_zone = config.engine.quiet_zone;

        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_ref()
                .and_then(|s| match s.as_str() {
                    "json" => Some(OutputFormat::Json),
                    "jsonl" => Some(OutputFormat::Jsonl),
                    _ => None,
                });
        }
        if args.metrics_scope.is_none() {
            args.metrics_scope = config
                .output
                .metrics_scope
                .as_ref()
                .and_then(|s| MetricsScope::from_str(s, true).ok());
        }

        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }
        if !args.metrics {
            args.metrics = config.output.metrics.unwrap_or(false);
        }

        let max_alloc_mb = config
            .decoder
            .max_alloc_mb
            .filter(|mb| *mb >= 1)
            .unwrap_or(defaults::MAX_ALLOC_MB);
        args.limits = Some(DecoderLimits {
            max_image_width: config.decoder.max_image_width,
            max_image_height: config.decoder.max_image_height,
            max_alloc: Some(max_alloc_mb.saturating_mul(1024 * 1024)),
        });

        args
    }

    /// Get output format with fallback to JSONL.
    fn format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }

    /// Get engine count with fallback to a single shared engine.
    fn engines(&self) -> usize {
        self.engines.unwrap_or(defaults::ENGINES)
    }

    fn quiet_zone(&self) -> u32 {
        self.quiet_zone.unwrap_or(DEFAULT_QUIET_ZONE)
    }

    fn limits(&self) -> DecoderLimits {
        self.limits.unwrap_or_default()
    }
}

/// Result of running the detect command.
#[allow(dead_code)] // Fields exposed for programmatic use
pub struct DetectSummary {
    /// Uploads that went through the pipeline.
    pub processed: usize,
    /// Uploads skipped before the pipeline.
    pub skipped: usize,
    /// Processed uploads with `success=false`.
    pub failed: usize,
    /// Exit code.
    pub exit_code: ExitCode,
}

/// Run the detect command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &DetectArgs) -> Result<DetectSummary> {
    info!("Running detect command on {} paths", args.paths.len());

    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }

    let source = FsImageSource::new(args.paths.clone(), args.recursive);
    let total = source.count_hint();

    let show_progress = !args.quiet && (args.progress || io::stderr().is_terminal());
    let progress_bar = ProgressBar::new(total.map(|t| t as u64), args.quiet, show_progress);

    let output = JsonOutput::stdout();
    let orchestrator = build_orchestrator(args);

    let summary = process_uploads(&source, &orchestrator, &output, &progress_bar, args)?;

    if args.metrics {
        let scope = args.metrics_scope.unwrap_or_default();
        let document = scope.render(orchestrator.metrics())?;
        JsonOutput::new(Box::new(io::stderr())).write_document(&document, true)?;
    }

    Ok(summary)
}

/// Wire the decoder, engine pool, and process-wide metrics together.
fn build_orchestrator(args: &DetectArgs) -> DetectionOrchestrator {
    let limits = args.limits();
    let quiet_zone = args.quiet_zone();
    let engines = args.engines();
    debug!("Engine pool: {engines} instance(s), quiet zone {quiet_zone}px, limits {limits:?}");

    let pool = EnginePool::new(engines, move || {
        Box::new(RqrrEngine::with_quiet_zone(quiet_zone))
    });
    DetectionOrchestrator::new(Box::new(ImageRasterDecoder::with_limits(limits)), pool)
        .with_metrics(MetricsRecorder::global())
}

/// Run every upload through the orchestrator on a bounded worker pool.
///
/// Reports are written in input order once the batch completes.
fn process_uploads(
    source: &dyn ImageSource,
    orchestrator: &DetectionOrchestrator,
    output: &JsonOutput,
    progress: &dyn ProgressSink,
    args: &DetectArgs,
) -> Result<DetectSummary> {
    let total = source.count_hint();

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = args.jobs {
        builder = builder.num_threads(jobs);
    }
    let workers = builder.build().context("Failed to start worker pool")?;
    debug!("Worker pool: {} thread(s)", workers.current_num_threads());

    let mut outcomes: Vec<(usize, Option<ScanReport>)> = workers.install(|| {
        source
            .uploads()
            .enumerate()
            .par_bridge()
            .map(|(index, item)| match item.and_then(admit) {
                Ok(upload) => {
                    progress.on_event(ProgressEvent::Started {
                        path: upload.path.clone(),
                        index,
                        total,
                    });
                    let report = orchestrator.detect_upload(&upload);
                    progress.on_event(ProgressEvent::Completed {
                        report: report.clone(),
                    });
                    (index, Some(report))
                }
                Err(e) => {
                    let (path, reason) = match e.downcast_ref::<SkippedInput>() {
                        Some(skipped) => (skipped.path.clone(), skipped.reason.clone()),
                        None => (format!("input {index}"), format!("{e:#}")),
                    };
                    progress.on_event(ProgressEvent::Skipped { path, reason });
                    (index, None)
                }
            })
            .collect()
    });
    outcomes.sort_unstable_by_key(|(index, _)| *index);

    let skipped = outcomes.iter().filter(|(_, r)| r.is_none()).count();
    let reports: Vec<ScanReport> = outcomes.into_iter().filter_map(|(_, r)| r).collect();
    let processed = reports.len();
    let failed = reports.iter().filter(|r| !r.result.is_success()).count();

    match args.format() {
        OutputFormat::Jsonl => {
            for report in &reports {
                output.write(report)?;
            }
        }
        OutputFormat::Json => output.write_array(&reports, args.pretty)?,
    }
    output.flush()?;

    progress.on_event(ProgressEvent::Finished {
        processed,
        skipped,
        failed,
    });

    let exit_code = if failed > 0 {
        ExitCode::DetectionFailed
    } else {
        ExitCode::Success
    };

    Ok(DetectSummary {
        processed,
        skipped,
        failed,
        exit_code,
    })
}

/// Rejects uploads whose declared content type is not an admitted image type.
fn admit(upload: ImageUpload) -> Result<ImageUpload> {
    if upload.is_admitted() {
        return Ok(upload);
    }
    let declared = upload.declared_type.as_deref().unwrap_or_default();
    Err(SkippedInput::new(upload.path, format!("unsupported content type {declared}")).into())
}
