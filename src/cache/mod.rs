//! Per-domain status cache.
//!
//! Every address of a domain shares one verdict, so the disposable check and
//! the MX query run once per domain rather than once per address. Concurrent
//! callers for a domain that is still being resolved wait on the same
//! computation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, FutureExt, Shared};

use crate::disposable::DisposableDomainSource;
use crate::email::Domain;
use crate::error_handling::{InfoType, ProcessingStats};
use crate::mx::MxResolver;

/// Combined verdict for a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainStatus {
    /// The domain or one of its parents is a known disposable provider
    pub disposable: bool,
    /// The domain publishes a usable MX record; always false when disposable
    pub has_mx: bool,
}

type PendingStatus = Shared<BoxFuture<'static, DomainStatus>>;

enum Slot {
    Ready(DomainStatus),
    Pending(PendingStatus),
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<Domain, Slot>,
    /// Disposable snapshot generation the entries were computed against
    generation: u64,
}

/// Memoizes [`DomainStatus`] per domain with single-flight resolution.
///
/// The map holds at most `capacity` entries; admitting one more clears it
/// first. It is also cleared whenever the disposable source publishes a new
/// snapshot, so list changes apply to the next lookup.
pub struct DomainStatusCache {
    state: Mutex<CacheState>,
    capacity: usize,
    disposable: Arc<DisposableDomainSource>,
    mx: Arc<MxResolver>,
    stats: Arc<ProcessingStats>,
}

impl DomainStatusCache {
    pub fn new(
        capacity: usize,
        disposable: Arc<DisposableDomainSource>,
        mx: Arc<MxResolver>,
        stats: Arc<ProcessingStats>,
    ) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            capacity: capacity.max(1),
            disposable,
            mx,
            stats,
        }
    }

    /// Returns the status of `domain`, computing it at most once at a time.
    pub async fn resolve(&self, domain: &Domain) -> DomainStatus {
        let (pending, generation) = {
            let mut state = self.lock_state();

            let current = self.disposable.generation();
            if state.generation != current {
                if !state.entries.is_empty() {
                    log::debug!(
                        "Disposable list changed (generation {current}), dropping {} cached domains",
                        state.entries.len()
                    );
                    self.stats.increment_info(InfoType::DomainCacheCleared);
                }
                state.entries.clear();
                state.generation = current;
            }

            match state.entries.get(domain) {
                Some(Slot::Ready(status)) => return *status,
                Some(Slot::Pending(pending)) => (pending.clone(), current),
                None => {
                    if state.entries.len() >= self.capacity {
                        log::info!(
                            "Domain cache reached {} entries, clearing",
                            state.entries.len()
                        );
                        self.stats.increment_info(InfoType::DomainCacheCleared);
                        // in-flight lookups keep their slot so late callers still join them
                        state.entries.retain(|_, slot| matches!(slot, Slot::Pending(_)));
                        if state.entries.len() >= self.capacity {
                            state.entries.clear();
                        }
                    }

                    let pending = check_domain(
                        Arc::clone(&self.disposable),
                        Arc::clone(&self.mx),
                        domain.clone(),
                    )
                    .boxed()
                    .shared();
                    state
                        .entries
                        .insert(domain.clone(), Slot::Pending(pending.clone()));
                    (pending, current)
                }
            }
        };

        let status = pending.await;
        self.complete(domain, generation, status);
        status
    }

    /// Number of cached or in-flight domains.
    pub fn len(&self) -> usize {
        self.lock_state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_state().entries.is_empty()
    }

    /// Drops every entry. In-flight lookups still complete for their callers.
    pub fn clear(&self) {
        self.lock_state().entries.clear();
    }

    fn complete(&self, domain: &Domain, generation: u64, status: DomainStatus) {
        let mut state = self.lock_state();
        if state.generation != generation {
            return;
        }
        // Only settle the slot this computation created; a clear may have dropped it
        if let Some(slot @ Slot::Pending(_)) = state.entries.get_mut(domain) {
            *slot = Slot::Ready(status);
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, CacheState> {
        // the map stays consistent even if a holder panicked
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

async fn check_domain(
    disposable: Arc<DisposableDomainSource>,
    mx: Arc<MxResolver>,
    domain: Domain,
) -> DomainStatus {
    if disposable.is_disposable(domain.as_str()) {
        return DomainStatus {
            disposable: true,
            has_mx: false,
        };
    }

    DomainStatus {
        disposable: false,
        has_mx: mx.has_mx(domain.as_str()).await,
    }
}
