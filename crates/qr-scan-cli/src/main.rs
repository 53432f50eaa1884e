//! qr-scan CLI - QR code detection with timing telemetry.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::detect::{self, DetectArgs};
use commands::{Cli, Commands, ExitCode};
use config::AppConfig;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let exit_code = match cli.command {
        Some(Commands::Detect(args)) => run_detect(args),
        Some(Commands::Health) => report(commands::health::run()),
        Some(Commands::Metrics(ref args)) => report(commands::metrics::run(args)),
        None => {
            // Default behavior: detect with flattened args
            if cli.detect.paths.is_empty() {
                eprintln!("error: No paths specified. Use --help for usage information.");
                return ExitCode::Error.into();
            }
            run_detect(cli.detect)
        }
    };

    exit_code.into()
}

fn run_detect(args: DetectArgs) -> ExitCode {
    let args = DetectArgs::with_config(args, &AppConfig::load());
    match detect::run(&args) {
        Ok(summary) => summary.exit_code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::Error
        }
    }
}

fn report(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::Error
        }
    }
}
