//! Validation run orchestration.
//!
//! A run goes through three phases:
//! - [`init`] - open the input, stage the output, build the shared resources
//! - the pipeline itself, with progress logging and list refresh in the background
//! - [`finalize`] - stop background tasks, commit or discard the output, print statistics

mod finalize;
mod init;
mod resources;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error_handling::RunError;
use crate::initialization::init_resolver;
use crate::mx::{HickoryMxLookup, MxLookup};

use finalize::finalize_run;
use init::init_run_resources;

/// Results of a validation run.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Addresses processed
    pub total: u64,
    /// Addresses written to `valid.txt`
    pub valid: u64,
    /// Addresses written to `invalid_format.txt`
    pub invalid_format: u64,
    /// Addresses written to `disposable.txt`
    pub disposable: u64,
    /// Addresses written to `missing_mx.txt`
    pub missing_mx: u64,
    /// Directory holding the result files
    pub output_dir: PathBuf,
    /// The four result files
    pub output_files: Vec<PathBuf>,
    /// Size of the disposable-domain set used for the run
    pub disposable_domains: usize,
    /// Elapsed time in seconds
    pub elapsed_seconds: f64,
}

/// Validates every address of `config.file` and writes the four result files.
///
/// MX lookups go through the system's default upstream resolvers. Cancelling
/// `cancel` stops the run; output written so far is removed and
/// [`RunError::Cancelled`] is returned.
///
/// # Errors
///
/// Returns a [`RunError`] whose [`exit_code`](RunError::exit_code) tells the
/// failure classes apart.
///
/// # Example
///
/// ```no_run
/// use email_sieve::{run_validation, Config};
/// use std::path::PathBuf;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config {
///     file: Some(PathBuf::from("addresses.txt")),
///     ..Default::default()
/// };
/// let report = run_validation(config, CancellationToken::new()).await?;
/// println!("{} of {} addresses are valid", report.valid, report.total);
/// # Ok(())
/// # }
/// ```
pub async fn run_validation(
    config: Config,
    cancel: CancellationToken,
) -> Result<ValidationReport, RunError> {
    let resolver = init_resolver(
        Duration::from_secs(config.dns_timeout_secs),
        Duration::from_secs(config.dns_min_ttl_secs),
    )?;
    run_validation_with(config, Arc::new(HickoryMxLookup::new(resolver)), cancel).await
}

/// Same as [`run_validation`], with MX queries answered by `lookup`.
pub async fn run_validation_with(
    config: Config,
    lookup: Arc<dyn MxLookup>,
    cancel: CancellationToken,
) -> Result<ValidationReport, RunError> {
    let resources = init_run_resources(&config, lookup, cancel.clone()).await?;
    let outcome = resources
        .pipeline
        .run(
            resources.input,
            Arc::clone(&resources.progress),
            resources.sinks,
            cancel,
            None,
        )
        .await;

    finalize_run(resources.finish, outcome).await
}
