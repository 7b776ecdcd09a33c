//! Configuration constants.
//!
//! This module defines the defaults used throughout the application,
//! including DNS timeouts, retry parameters, cache sizes, and file names.

use std::time::Duration;

/// Interval between progress log lines in seconds
pub const LOGGING_INTERVAL_SECS: u64 = 5;

// DNS
/// Maximum simultaneous outstanding MX queries
pub const DNS_CONCURRENCY_LIMIT: usize = 10;
/// Per-query MX timeout in seconds
/// Kept short so a dead nameserver fails fast and the retry policy takes over
pub const DNS_TIMEOUT_SECS: u64 = 3;
/// Total MX attempts per domain (initial attempt + retries)
pub const DNS_MAX_ATTEMPTS: usize = 2;
/// Fixed delay before a retry in seconds
pub const RETRY_BASE_DELAY_SECS: u64 = 5;
/// Upper bound of the random jitter added to each retry delay in seconds
pub const RETRY_JITTER_SECS: u64 = 2;
/// Minimum time a DNS answer stays in the resolver cache (30 minutes)
pub const DNS_MIN_TTL_SECS: u64 = 30 * 60;
/// Number of answers the resolver keeps in its own cache
pub const DNS_RESOLVER_CACHE_SIZE: usize = 32 * 1024;

// Domain cache
/// Entries held before the domain status cache is cleared wholesale
pub const DOMAIN_CACHE_CAPACITY: usize = 500_000;

// Pipeline
/// Slots in each category sink channel before producers block
pub const SINK_CHANNEL_CAPACITY: usize = 64;

// Disposable domains
/// Default storage directory for the cached remote list and the custom list
pub const DEFAULT_STORAGE_DIR: &str = ".email_sieve";
/// Community-maintained list of disposable email domains
pub const DEFAULT_DISPOSABLE_LIST_URL: &str =
    "https://raw.githubusercontent.com/disposable-email-domains/disposable-email-domains/main/disposable_email_blocklist.conf";
/// Remote list is re-downloaded once the cached copy is older than this (24 hours)
pub const DISPOSABLE_REFRESH_INTERVAL_HOURS: u64 = 24;
/// How often the background task checks for stale or modified lists
pub const DISPOSABLE_WATCH_INTERVAL: Duration = Duration::from_secs(60);
/// Minimum wait before retrying a failed background download
pub const DISPOSABLE_FETCH_RETRY_INTERVAL: Duration = Duration::from_secs(15 * 60);
/// Timeout for downloading the remote list
pub const DISPOSABLE_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
/// File name of the cached remote list inside the storage directory
pub const REMOTE_LIST_FILE: &str = "disposable_domains.txt";
/// File name of the cached remote list metadata inside the storage directory
pub const REMOTE_METADATA_FILE: &str = "disposable_domains.json";
/// File name of the per-install custom list inside the storage directory
pub const CUSTOM_LIST_FILE: &str = "custom_disposable_domains.txt";

/// Header written into a freshly created custom list.
pub const CUSTOM_LIST_HEADER: &str = "\
# Custom disposable email domains, one per line.
# Subdomains of a listed domain are matched as well.
# Lines starting with '#' are ignored.
";

/// User-Agent sent when downloading the remote list
pub const HTTP_USER_AGENT: &str = concat!("email_sieve/", env!("CARGO_PKG_VERSION"));

// Output
/// Default directory for the categorized output files
pub const DEFAULT_OUTPUT_DIR: &str = "./results";
