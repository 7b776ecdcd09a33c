//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::*;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Returns the default worker count: half the available parallelism, at least one.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() / 2)
        .unwrap_or(1)
        .max(1)
}

/// Validation run configuration.
///
/// Used both as the clap-derived command line of the binary and as a plain
/// struct for library callers (see [`Config::default`]).
///
/// # Examples
///
/// ```no_run
/// use email_sieve::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     file: Some(PathBuf::from("addresses.txt")),
///     output_dir: PathBuf::from("./out"),
///     workers: 8,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "email_sieve",
    version,
    about = "Sorts email addresses into valid, invalid-format, disposable and missing-MX lists."
)]
pub struct Config {
    /// File of addresses to validate (`-` reads stdin)
    #[arg(value_parser, required_unless_present = "merge")]
    pub file: Option<PathBuf>,

    /// Directory receiving the four result files
    #[arg(long, short = 'o', value_parser, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Extra disposable-domain list used for this run only
    #[arg(long, value_parser)]
    pub custom_file: Option<PathBuf>,

    /// Directory holding the cached remote list and the per-install custom list
    #[arg(long, value_parser, default_value = DEFAULT_STORAGE_DIR)]
    pub storage_dir: PathBuf,

    /// Remote disposable-domain list URL
    #[arg(long, default_value = DEFAULT_DISPOSABLE_LIST_URL)]
    pub disposable_url: String,

    /// Re-download the remote list once the cached copy is older than this many hours
    #[arg(long, default_value_t = DISPOSABLE_REFRESH_INTERVAL_HOURS)]
    pub refresh_interval_hours: u64,

    /// Re-download the remote list before starting regardless of its age
    #[arg(long)]
    pub force_refresh: bool,

    /// Number of validation workers (defaults to half the available cores)
    #[arg(long, default_value_t = default_workers())]
    pub workers: usize,

    /// Maximum simultaneous outstanding MX queries
    #[arg(long, default_value_t = DNS_CONCURRENCY_LIMIT)]
    pub dns_concurrency: usize,

    /// Per-query MX timeout in seconds
    #[arg(long, default_value_t = DNS_TIMEOUT_SECS)]
    pub dns_timeout_secs: u64,

    /// Total MX attempts per domain on transient failures
    #[arg(long, default_value_t = DNS_MAX_ATTEMPTS)]
    pub dns_max_attempts: usize,

    /// Fixed delay before an MX retry in seconds
    #[arg(long, default_value_t = RETRY_BASE_DELAY_SECS)]
    pub retry_base_delay_secs: u64,

    /// Maximum random jitter added to each MX retry delay in seconds
    #[arg(long, default_value_t = RETRY_JITTER_SECS)]
    pub retry_jitter_secs: u64,

    /// Minimum time a DNS answer is cached by the resolver in seconds
    #[arg(long, default_value_t = DNS_MIN_TTL_SECS)]
    pub dns_min_ttl_secs: u64,

    /// Domains held in the status cache before it is cleared
    #[arg(long, default_value_t = DOMAIN_CACHE_CAPACITY)]
    pub cache_capacity: usize,

    /// Slots per result sink before workers block
    #[arg(long, default_value_t = SINK_CHANNEL_CAPACITY)]
    pub sink_capacity: usize,

    /// Seconds between progress log lines
    #[arg(long, default_value_t = LOGGING_INTERVAL_SECS)]
    pub progress_interval_secs: u64,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Merge address lists instead of validating (union of all given files)
    #[arg(long, num_args = 1.., value_parser)]
    pub merge: Vec<PathBuf>,

    /// Addresses to remove from the merged list
    #[arg(long, value_parser, requires = "merge")]
    pub subtract: Option<PathBuf>,

    /// Destination of the merged list
    #[arg(long, value_parser, default_value = "./merged.txt")]
    pub merge_output: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            custom_file: None,
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            disposable_url: DEFAULT_DISPOSABLE_LIST_URL.to_string(),
            refresh_interval_hours: DISPOSABLE_REFRESH_INTERVAL_HOURS,
            force_refresh: false,
            workers: default_workers(),
            dns_concurrency: DNS_CONCURRENCY_LIMIT,
            dns_timeout_secs: DNS_TIMEOUT_SECS,
            dns_max_attempts: DNS_MAX_ATTEMPTS,
            retry_base_delay_secs: RETRY_BASE_DELAY_SECS,
            retry_jitter_secs: RETRY_JITTER_SECS,
            dns_min_ttl_secs: DNS_MIN_TTL_SECS,
            cache_capacity: DOMAIN_CACHE_CAPACITY,
            sink_capacity: SINK_CHANNEL_CAPACITY,
            progress_interval_secs: LOGGING_INTERVAL_SECS,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            merge: Vec::new(),
            subtract: None,
            merge_output: PathBuf::from("./merged.txt"),
        }
    }
}

impl Config {
    /// Rejects settings that would stall or disable the pipeline.
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("workers must be at least 1".to_string());
        }
        if self.dns_concurrency == 0 {
            return Err("dns-concurrency must be at least 1".to_string());
        }
        if self.dns_max_attempts == 0 {
            return Err("dns-max-attempts must be at least 1".to_string());
        }
        if self.cache_capacity == 0 {
            return Err("cache-capacity must be at least 1".to_string());
        }
        if self.sink_capacity == 0 {
            return Err("sink-capacity must be at least 1".to_string());
        }
        if self.dns_timeout_secs == 0 {
            return Err("dns-timeout-secs must be at least 1".to_string());
        }
        Ok(())
    }

    /// Age after which the cached remote list is re-downloaded.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_hours.saturating_mul(60 * 60))
    }
}
