//! DNS resolver initialization.

use std::sync::Arc;
use std::time::Duration;

use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;

use crate::config::DNS_RESOLVER_CACHE_SIZE;
use crate::error_handling::InitializationError;

/// Initializes the DNS resolver used for MX lookups.
///
/// Uses the default upstream configuration with:
/// - A single attempt per query, since retries are driven by [`crate::mx::MxResolver`]
/// - `ndots = 0` so no search domain is ever appended
/// - Answers (including negative ones) cached for at least `min_ttl`
///
/// # Errors
///
/// Returns `InitializationError::DnsResolverError` if the resolver cannot be built.
pub fn init_resolver(
    timeout: Duration,
    min_ttl: Duration,
) -> Result<Arc<TokioAsyncResolver>, InitializationError> {
    if timeout.is_zero() {
        return Err(InitializationError::DnsResolverError(
            "DNS timeout must be greater than zero".to_string(),
        ));
    }

    let mut opts = ResolverOpts::default();
    opts.timeout = timeout;
    opts.attempts = 1;
    opts.ndots = 0;
    opts.cache_size = DNS_RESOLVER_CACHE_SIZE;
    opts.positive_min_ttl = Some(min_ttl);
    opts.negative_min_ttl = Some(min_ttl);

    Ok(Arc::new(TokioAsyncResolver::tokio(
        ResolverConfig::default(),
        opts,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_resolver() {
        let resolver = init_resolver(Duration::from_secs(3), Duration::from_secs(1800));
        assert!(resolver.is_ok());
    }

    #[tokio::test]
    async fn test_init_resolver_rejects_zero_timeout() {
        let result = init_resolver(Duration::ZERO, Duration::from_secs(1800));
        assert!(matches!(
            result,
            Err(InitializationError::DnsResolverError(_))
        ));
    }
}
