//! Single MX queries.

use std::sync::Arc;

use async_trait::async_trait;
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::TokioAsyncResolver;

use crate::error_handling::DnsLookupError;

/// One MX query for a domain.
///
/// Implementations return `Ok(true)` when at least one usable exchange is
/// published. Timeouts and retries are applied by [`super::MxResolver`].
#[async_trait]
pub trait MxLookup: Send + Sync {
    async fn lookup_mx(&self, domain: &str) -> Result<bool, DnsLookupError>;
}

/// [`MxLookup`] backed by the shared hickory resolver.
pub struct HickoryMxLookup {
    resolver: Arc<TokioAsyncResolver>,
}

impl HickoryMxLookup {
    pub fn new(resolver: Arc<TokioAsyncResolver>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl MxLookup for HickoryMxLookup {
    async fn lookup_mx(&self, domain: &str) -> Result<bool, DnsLookupError> {
        // Fully qualified so no search domain is appended
        let name = format!("{domain}.");
        match self.resolver.mx_lookup(name.as_str()).await {
            // A single MX pointing at "." (RFC 7505) means the domain accepts no mail
            Ok(lookup) => Ok(lookup.iter().any(|mx| !mx.exchange().is_root())),
            Err(e) => Err(classify_resolve_error(&e)),
        }
    }
}

/// Maps a hickory error onto the retry policy's view of it.
pub(crate) fn classify_resolve_error(error: &ResolveError) -> DnsLookupError {
    match error.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => match *response_code {
            ResponseCode::ServFail | ResponseCode::Refused => {
                DnsLookupError::Transient(error.to_string())
            }
            _ => DnsLookupError::NoRecords,
        },
        ResolveErrorKind::Timeout
        | ResolveErrorKind::Io(_)
        | ResolveErrorKind::Proto(_)
        | ResolveErrorKind::NoConnections => DnsLookupError::Transient(error.to_string()),
        _ => DnsLookupError::Permanent(error.to_string()),
    }
}
