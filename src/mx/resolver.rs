//! Admission-gated, retrying MX resolution.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio_retry::RetryIf;
use tokio_util::sync::CancellationToken;

use crate::config::{
    Config, DNS_CONCURRENCY_LIMIT, DNS_MAX_ATTEMPTS, DNS_TIMEOUT_SECS, RETRY_BASE_DELAY_SECS,
    RETRY_JITTER_SECS,
};
use crate::email::normalize_domain;
use crate::error_handling::{DnsLookupError, ErrorType, InfoType, ProcessingStats};

use super::lookup::MxLookup;
use super::retry::jittered_delays;

/// Limits and retry policy for MX queries.
#[derive(Debug, Clone)]
pub struct MxSettings {
    /// Maximum simultaneous outstanding queries
    pub concurrency: usize,
    /// Timeout of a single query
    pub timeout: Duration,
    /// Total attempts per domain, including the first
    pub max_attempts: usize,
    /// Fixed part of the delay before a retry
    pub base_delay: Duration,
    /// Upper bound of the random part of the delay before a retry
    pub jitter: Duration,
}

impl Default for MxSettings {
    fn default() -> Self {
        Self {
            concurrency: DNS_CONCURRENCY_LIMIT,
            timeout: Duration::from_secs(DNS_TIMEOUT_SECS),
            max_attempts: DNS_MAX_ATTEMPTS,
            base_delay: Duration::from_secs(RETRY_BASE_DELAY_SECS),
            jitter: Duration::from_secs(RETRY_JITTER_SECS),
        }
    }
}

impl From<&Config> for MxSettings {
    fn from(config: &Config) -> Self {
        Self {
            concurrency: config.dns_concurrency,
            timeout: Duration::from_secs(config.dns_timeout_secs),
            max_attempts: config.dns_max_attempts,
            base_delay: Duration::from_secs(config.retry_base_delay_secs),
            jitter: Duration::from_secs(config.retry_jitter_secs),
        }
    }
}

/// Answers whether a domain publishes MX records.
///
/// At most `concurrency` queries are outstanding at once; further callers
/// wait in arrival order. The gate permit is held for one query only and is
/// released while waiting to retry. Transient failures are retried with
/// [`jittered_delays`]; anything else, including exhausting the attempts or
/// cancellation, yields `false`.
pub struct MxResolver {
    lookup: Arc<dyn MxLookup>,
    gate: Semaphore,
    settings: MxSettings,
    stats: Arc<ProcessingStats>,
    cancel: CancellationToken,
}

impl MxResolver {
    pub fn new(
        lookup: Arc<dyn MxLookup>,
        settings: MxSettings,
        stats: Arc<ProcessingStats>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            lookup,
            gate: Semaphore::new(settings.concurrency.max(1)),
            settings,
            stats,
            cancel,
        }
    }

    /// Returns true if `domain` has at least one usable MX record.
    pub async fn has_mx(&self, domain: &str) -> bool {
        let domain = normalize_domain(domain);
        if domain.is_empty() {
            return false;
        }

        let attempts = AtomicUsize::new(0);
        let strategy = jittered_delays(
            self.settings.base_delay,
            self.settings.jitter,
            self.settings.max_attempts,
        );

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                log::debug!("MX lookup for {domain} abandoned: cancelled");
                return false;
            }
            result = RetryIf::spawn(
                strategy,
                || self.attempt(&domain, &attempts),
                DnsLookupError::is_transient,
            ) => result,
        };

        match result {
            Ok(true) => true,
            Ok(false) | Err(DnsLookupError::NoRecords) => {
                log::debug!("No MX records for {domain}");
                self.stats.increment_info(InfoType::DnsNoMxRecords);
                false
            }
            Err(e @ DnsLookupError::Transient(_)) => {
                log::debug!(
                    "MX lookup for {domain} failed after {} attempts: {e}",
                    attempts.load(Ordering::Relaxed)
                );
                self.stats.increment_error(ErrorType::DnsMxRetriesExhausted);
                false
            }
            Err(e @ DnsLookupError::Permanent(_)) => {
                log::debug!("MX lookup for {domain} failed: {e}");
                false
            }
        }
    }

    /// Number of queries that could start right now without waiting.
    pub fn available_permits(&self) -> usize {
        self.gate.available_permits()
    }

    async fn attempt(&self, domain: &str, attempts: &AtomicUsize) -> Result<bool, DnsLookupError> {
        let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
        if attempt > 1 {
            log::debug!("Retrying MX lookup for {domain} (attempt {attempt})");
            self.stats.increment_info(InfoType::DnsMxRetry);
        }

        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| DnsLookupError::Permanent("DNS admission gate closed".into()))?;

        match tokio::time::timeout(self.settings.timeout, self.lookup.lookup_mx(domain)).await {
            Ok(Ok(found)) => Ok(found),
            Ok(Err(e)) => {
                match &e {
                    DnsLookupError::Transient(_) => {
                        self.stats.increment_error(ErrorType::DnsMxTransientError)
                    }
                    DnsLookupError::Permanent(_) => {
                        self.stats.increment_error(ErrorType::DnsMxPermanentError)
                    }
                    DnsLookupError::NoRecords => {}
                }
                Err(e)
            }
            Err(_) => {
                self.stats.increment_error(ErrorType::DnsMxTimeout);
                Err(DnsLookupError::Transient(format!(
                    "query timed out after {:?}",
                    self.settings.timeout
                )))
            }
        }
    }
}
