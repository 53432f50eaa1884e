//! CLI command definitions and handlers.

pub mod detect;
pub mod health;
pub mod metrics;

use clap::{Parser, Subcommand};

/// qr-scan - QR code detection with timing telemetry
#[derive(Parser)]
#[command(name = "qr-scan")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Detect arguments used when no subcommand is given.
    #[command(flatten)]
    pub detect: detect::DetectArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Detect and decode QR codes in images
    Detect(detect::DetectArgs),
    /// Print the service health document
    Health,
    /// Print the metrics snapshot
    Metrics(metrics::MetricsArgs),
}

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Every image was processed successfully.
    Success = 0,
    /// At least one image produced `success=false`.
    DetectionFailed = 1,
    /// Usage or runtime error.
    Error = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}
