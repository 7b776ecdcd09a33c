//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `email_sieve` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - Ctrl-C handling
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use email_sieve::initialization::init_logger_with;
use email_sieve::{run_merge, run_validation, CancellationToken, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // .env may set RUST_LOG; a missing file is fine
    let _ = dotenvy::dotenv();

    let config = Config::parse();

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    if !config.merge.is_empty() {
        match run_merge(&config.merge, config.subtract.as_deref(), &config.merge_output).await {
            Ok(report) => {
                println!(
                    "✅ Merged {} file{} ({} addresses read, {} removed): {} addresses written to {}",
                    report.inputs,
                    if report.inputs == 1 { "" } else { "s" },
                    report.read,
                    report.removed,
                    report.written,
                    report.output.display()
                );
                return Ok(());
            }
            Err(e) => {
                eprintln!("email_sieve error: {e}");
                process::exit(e.exit_code());
            }
        }
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("Interrupt received, stopping workers");
                cancel.cancel();
            }
        });
    }

    match run_validation(config, cancel).await {
        Ok(report) => {
            println!(
                "✅ Processed {} address{} in {:.1}s: {} valid, {} invalid format, {} disposable, {} missing MX",
                report.total,
                if report.total == 1 { "" } else { "es" },
                report.elapsed_seconds,
                report.valid,
                report.invalid_format,
                report.disposable,
                report.missing_mx
            );
            println!("Results saved in {}", report.output_dir.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("email_sieve error: {e}");
            process::exit(e.exit_code());
        }
    }
}
