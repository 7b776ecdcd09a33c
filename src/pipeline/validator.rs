//! Worker pool that classifies a stream of addresses.

use std::io;
use std::sync::Arc;

use futures::stream::{Stream, StreamExt};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::cache::DomainStatusCache;
use crate::config::{default_workers, Config, SINK_CHANNEL_CAPACITY};
use crate::email::check_syntax;
use crate::error_handling::{PipelineError, ProcessingStats};

use super::outcome::{RejectReason, ValidationOutcome};
use super::progress::{ProgressCounters, ProgressSnapshot};
use super::sinks::{spawn_drains, CategorySinks, SinkSenders};

/// Called with every classified address, before it is handed to its sink.
pub type OutcomeObserver = Option<Arc<dyn Fn(&str, &ValidationOutcome) + Send + Sync>>;

/// Worker pool sizing.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Number of worker tasks
    pub workers: usize,
    /// Slots in each category channel
    pub sink_capacity: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            sink_capacity: SINK_CHANNEL_CAPACITY,
        }
    }
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            workers: config.workers,
            sink_capacity: config.sink_capacity,
        }
    }
}

/// Totals of a completed run.
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    /// Final counter values
    pub progress: ProgressSnapshot,
    /// Addresses written by the sinks; equals `progress.processed`
    pub written: u64,
}

/// Classifies addresses as valid, invalid-format, disposable or missing-MX.
pub struct ValidationPipeline {
    cache: Arc<DomainStatusCache>,
    stats: Arc<ProcessingStats>,
    settings: PipelineSettings,
}

impl ValidationPipeline {
    pub fn new(
        cache: Arc<DomainStatusCache>,
        stats: Arc<ProcessingStats>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            cache,
            stats,
            settings,
        }
    }

    /// Validates a single address.
    ///
    /// Never fails: malformed input and lookup failures become a rejection.
    pub async fn validate_one(&self, address: &str) -> ValidationOutcome {
        validate(&self.cache, address).await
    }

    /// Validates every address of `input` and routes it to its sink.
    ///
    /// `progress` is updated as soon as an address is classified, before the
    /// sink write. Output order is not related to input order.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Cancelled`] if `cancel` fired before the input was exhausted
    /// - [`PipelineError::Input`] if reading `input` failed; the workers stop at once
    /// - [`PipelineError::Sink`] if a sink failed to write
    pub async fn run<S>(
        &self,
        input: S,
        progress: Arc<ProgressCounters>,
        sinks: CategorySinks,
        cancel: CancellationToken,
        observer: OutcomeObserver,
    ) -> Result<RunSummary, PipelineError>
    where
        S: Stream<Item = io::Result<String>> + Send + Unpin + 'static,
    {
        let workers = self.settings.workers.max(1);
        log::info!("Starting validation with {workers} workers");

        let input = Arc::new(Mutex::new(input));
        let input_error = Arc::new(std::sync::Mutex::new(None));
        // fires on user cancellation or on the first input error
        let stop = cancel.child_token();
        let (senders, drains) = spawn_drains(sinks, self.settings.sink_capacity, &self.stats);

        let handles: Vec<_> = (0..workers)
            .map(|id| {
                let worker = Worker {
                    id,
                    input: Arc::clone(&input),
                    cache: Arc::clone(&self.cache),
                    progress: Arc::clone(&progress),
                    input_error: Arc::clone(&input_error),
                    senders: senders.clone(),
                    stop: stop.clone(),
                    observer: observer.clone(),
                };
                tokio::spawn(worker.run())
            })
            .collect();
        // drains finish once every worker has dropped its senders
        drop(senders);

        for handle in handles {
            if let Err(e) = handle.await {
                log::error!("Validation worker failed: {e}");
            }
        }

        let mut written = 0;
        let mut sink_error = None;
        for drain in drains {
            match drain.await {
                Ok(Ok(count)) => written += count,
                Ok(Err(e)) => {
                    sink_error.get_or_insert(e);
                }
                Err(e) => log::error!("Sink drain task failed: {e}"),
            }
        }

        if cancel.is_cancelled() {
            log::warn!("Validation cancelled");
            return Err(PipelineError::Cancelled);
        }
        let input_error = input_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(source) = input_error {
            return Err(PipelineError::Input(source));
        }
        if let Some(e) = sink_error {
            return Err(e);
        }

        Ok(RunSummary {
            progress: progress.snapshot(),
            written,
        })
    }
}

async fn validate(cache: &DomainStatusCache, address: &str) -> ValidationOutcome {
    let Some(parsed) = check_syntax(address) else {
        return ValidationOutcome::rejected(RejectReason::InvalidFormat, None);
    };

    let status = cache.resolve(&parsed.domain).await;
    if status.disposable {
        ValidationOutcome::rejected(RejectReason::Disposable, Some(parsed.domain))
    } else if status.has_mx {
        ValidationOutcome::accepted(parsed.domain)
    } else {
        ValidationOutcome::rejected(RejectReason::MissingMx, Some(parsed.domain))
    }
}

struct Worker<S> {
    id: usize,
    input: Arc<Mutex<S>>,
    input_error: Arc<std::sync::Mutex<Option<io::Error>>>,
    cache: Arc<DomainStatusCache>,
    progress: Arc<ProgressCounters>,
    senders: SinkSenders,
    stop: CancellationToken,
    observer: OutcomeObserver,
}

impl<S> Worker<S>
where
    S: Stream<Item = io::Result<String>> + Send + Unpin + 'static,
{
    async fn run(self) {
        let mut handled = 0u64;

        loop {
            if self.stop.is_cancelled() {
                break;
            }

            let next = {
                let mut input = self.input.lock().await;
                let item = tokio::select! {
                    biased;
                    _ = self.stop.cancelled() => None,
                    item = input.next() => item,
                };
                // stop the others before releasing the input
                match item {
                    Some(Ok(address)) => Some(address),
                    Some(Err(e)) => {
                        log::error!("Worker {} stopping: input read failed: {e}", self.id);
                        self.fail_input(e);
                        None
                    }
                    None => None,
                }
            };
            let Some(address) = next else {
                break;
            };

            if self.stop.is_cancelled() {
                break;
            }

            let outcome = tokio::select! {
                biased;
                _ = self.stop.cancelled() => break,
                outcome = validate(&self.cache, &address) => outcome,
            };

            let category = outcome.category();
            self.progress.record(category);
            if let Some(observer) = &self.observer {
                observer(&address, &outcome);
            }

            let sent = tokio::select! {
                biased;
                _ = self.stop.cancelled() => break,
                sent = self.senders.for_category(category).send(address) => sent,
            };
            if sent.is_err() {
                log::debug!("Worker {} stopping: {category} sink closed", self.id);
                break;
            }
            handled += 1;
        }

        log::debug!("Worker {} finished after {handled} addresses", self.id);
    }

    fn fail_input(&self, error: io::Error) {
        self.input_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get_or_insert(error);
        self.stop.cancel();
    }
}
