//! Error type definitions.
//!
//! This module defines the error enums used at each boundary (DNS, HTTP,
//! filesystem, run) plus the counter categories tracked during a run.

use std::path::PathBuf;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// Error initializing the DNS resolver.
    #[error("DNS resolver initialization error: {0}")]
    DnsResolverError(String),
}

/// Outcome of a single MX query that did not produce an answer.
///
/// The split between transient and permanent failures drives the retry
/// policy in [`crate::mx::MxResolver`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DnsLookupError {
    /// Timeout, I/O failure or server-side failure; worth retrying.
    #[error("transient DNS failure: {0}")]
    Transient(String),

    /// The domain exists but publishes no MX records, or does not exist.
    #[error("no MX records")]
    NoRecords,

    /// Any other failure that will not go away on retry.
    #[error("DNS failure: {0}")]
    Permanent(String),
}

impl DnsLookupError {
    /// Returns true if another attempt could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, DnsLookupError::Transient(_))
    }
}

/// Errors raised while loading or downloading disposable-domain lists.
///
/// These never abort a run; they are logged and the previous snapshot keeps
/// serving lookups.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Reading or writing a list file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The HTTP request for the remote list failed.
    #[error("failed to download disposable list: {0}")]
    Http(#[from] ReqwestError),

    /// The remote list responded with a non-success status.
    #[error("disposable list download returned HTTP {0}")]
    Status(u16),

    /// The cached metadata file could not be parsed.
    #[error("invalid list metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}

impl SourceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SourceError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors surfaced by [`crate::pipeline::ValidationPipeline::run`].
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The run was cancelled before the input was exhausted.
    #[error("validation cancelled")]
    Cancelled,

    /// Reading the input failed partway through.
    #[error("failed to read input: {0}")]
    Input(#[source] std::io::Error),

    /// A sink could not persist an address.
    #[error("failed to write {category} result: {source}")]
    Sink {
        /// Category file that failed
        category: &'static str,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Run-level failures. Each maps to a distinct process exit status.
#[derive(Error, Debug)]
pub enum RunError {
    /// The input file is missing or unreadable.
    #[error("cannot read input {}: {source}", path.display())]
    InputUnavailable {
        /// Input path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The output directory or one of its files could not be created.
    #[error("cannot create output in {}: {source}", path.display())]
    OutputUnavailable {
        /// Output path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The user cancelled the run; partial output has been removed.
    #[error("run cancelled; partial results removed")]
    Cancelled,

    /// Invalid configuration or a resource failed to initialize.
    #[error("initialization failed: {0}")]
    Initialization(String),
}

impl RunError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Initialization(_) => 1,
            RunError::InputUnavailable { .. } => 2,
            RunError::OutputUnavailable { .. } => 3,
            RunError::Cancelled => 130,
        }
    }
}

impl From<InitializationError> for RunError {
    fn from(e: InitializationError) -> Self {
        RunError::Initialization(e.to_string())
    }
}

/// Failures counted during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    // DNS errors
    DnsMxTimeout,
    DnsMxTransientError,
    DnsMxPermanentError,
    DnsMxRetriesExhausted,
    // Disposable list errors
    DisposableListFetchError,
    DisposableListReadError,
    // Output errors
    SinkWriteError,
}

/// Notable events that are not failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    DnsMxRetry,
    DnsNoMxRecords,
    DomainCacheCleared,
    DisposableSnapshotRebuilt,
    DisposableListDownloaded,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::DnsMxTimeout => "DNS MX query timeout",
            ErrorType::DnsMxTransientError => "DNS MX transient error",
            ErrorType::DnsMxPermanentError => "DNS MX permanent error",
            ErrorType::DnsMxRetriesExhausted => "DNS MX retries exhausted",
            ErrorType::DisposableListFetchError => "Disposable list download error",
            ErrorType::DisposableListReadError => "Disposable list read error",
            ErrorType::SinkWriteError => "Result sink write error",
        }
    }
}

impl InfoType {
    /// Returns a human-readable string representation of the info type.
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::DnsMxRetry => "DNS MX retry",
            InfoType::DnsNoMxRecords => "Domain without MX records",
            InfoType::DomainCacheCleared => "Domain cache cleared",
            InfoType::DisposableSnapshotRebuilt => "Disposable snapshot rebuilt",
            InfoType::DisposableListDownloaded => "Disposable list downloaded",
        }
    }
}
