use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::DISPOSABLE_FETCH_RETRY_INTERVAL;
use crate::email::normalize_domain;
use crate::error_handling::{ErrorType, InfoType, ProcessingStats};

use super::set::DisposableSet;
use super::store::{file_stamp, read_list_file, FileStamp, ListStore};

/// Where the disposable lists come from.
#[derive(Debug, Clone)]
pub struct DisposableSettings {
    /// Directory holding the cached remote list and the default custom list
    pub storage_dir: PathBuf,
    /// URL of the remote list
    pub source_url: String,
    /// Age after which the cached remote list is re-downloaded
    pub refresh_interval: Duration,
}

/// Result of a refresh or rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshReport {
    /// Whether a new copy of the remote list was downloaded
    pub downloaded: bool,
    /// Domains in the published snapshot
    pub domains: usize,
    /// Generation of the published snapshot
    pub generation: u64,
}

/// Mutable bookkeeping, only touched while the state lock is held.
#[derive(Default)]
struct SourceState {
    initialized: bool,
    custom_override: Option<PathBuf>,
    /// Files merged into the current snapshot and their stamps at load time
    loaded_files: Vec<(PathBuf, FileStamp)>,
    /// Background downloads are suppressed until this instant after a failure
    retry_download_after: Option<Instant>,
}

/// Maintains the merged set of disposable domains.
///
/// The set is built from three inputs: the cached remote list, the default
/// custom list in the storage directory and an optional override file. Every
/// rebuild publishes a new immutable [`DisposableSet`] with a higher
/// generation; lookups read the current snapshot without locking.
///
/// Download and file errors are logged and counted in [`ProcessingStats`].
/// They never fail an operation: the last good snapshot keeps serving.
pub struct DisposableDomainSource {
    snapshot: ArcSwap<DisposableSet>,
    state: Mutex<SourceState>,
    store: ListStore,
    source_url: String,
    refresh_interval: Duration,
    client: reqwest::Client,
    stats: Arc<ProcessingStats>,
}

impl DisposableDomainSource {
    /// Creates an empty source. Call [`initialize`](Self::initialize) before use.
    pub fn new(
        settings: DisposableSettings,
        client: reqwest::Client,
        stats: Arc<ProcessingStats>,
    ) -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(DisposableSet::default()),
            state: Mutex::new(SourceState::default()),
            store: ListStore::new(settings.storage_dir),
            source_url: settings.source_url,
            refresh_interval: settings.refresh_interval,
            client,
            stats,
        }
    }

    /// Prepares the storage directory and publishes the first snapshot.
    ///
    /// The remote list is only downloaded when the cached copy is missing or
    /// stale. Calling this again is a no-op.
    pub async fn initialize(&self) -> RefreshReport {
        let mut state = self.state.lock().await;
        if state.initialized {
            return self.current_report(false);
        }

        if let Err(e) = self.store.ensure_layout().await {
            log::warn!("Failed to prepare disposable list storage: {e}");
            self.stats.increment_error(ErrorType::DisposableListReadError);
        }

        let report = self.refresh_locked(&mut state, false).await;
        state.initialized = true;
        report
    }

    /// Installs or clears the override list and rebuilds the snapshot.
    ///
    /// A missing file is reported but not treated as an error; it is picked up
    /// by the background watcher once it appears.
    pub async fn set_custom_file(&self, path: Option<PathBuf>) -> RefreshReport {
        let mut state = self.state.lock().await;

        if let Some(path) = &path {
            if !tokio::fs::try_exists(path).await.unwrap_or(false) {
                log::warn!(
                    "Custom disposable list {} does not exist, continuing without it",
                    path.display()
                );
            }
        }

        state.custom_override = path;
        self.rebuild_locked(&mut state, false).await
    }

    /// Re-downloads the remote list if it is stale (or always when `force`),
    /// then rebuilds the snapshot.
    pub async fn refresh(&self, force: bool) -> RefreshReport {
        let mut state = self.state.lock().await;
        self.refresh_locked(&mut state, force).await
    }

    /// Rebuilds only if the remote copy turned stale or a list file changed.
    ///
    /// Returns `None` when nothing changed. Used by the background refresher.
    pub async fn check_for_changes(&self) -> Option<RefreshReport> {
        let mut state = self.state.lock().await;

        let download_allowed = match state.retry_download_after {
            Some(after) => Instant::now() >= after,
            None => true,
        };

        let downloaded = download_allowed
            && self
                .store
                .is_stale(&self.source_url, self.refresh_interval)
                .await
            && self.download_locked(&mut state).await;

        if downloaded || self.files_changed(&state).await {
            Some(self.rebuild_locked(&mut state, downloaded).await)
        } else {
            None
        }
    }

    /// Returns true if `domain` or one of its parent domains is disposable.
    pub fn is_disposable(&self, domain: &str) -> bool {
        let domain = normalize_domain(domain);
        self.snapshot.load().matches(&domain)
    }

    /// The currently published snapshot.
    pub fn snapshot(&self) -> Arc<DisposableSet> {
        self.snapshot.load_full()
    }

    /// Generation of the currently published snapshot.
    pub fn generation(&self) -> u64 {
        self.snapshot.load().generation()
    }

    /// Number of domains in the current snapshot.
    pub fn len(&self) -> usize {
        self.snapshot.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.load().is_empty()
    }

    /// Path of the per-install custom list.
    pub fn custom_list_path(&self) -> PathBuf {
        self.store.custom_list_path()
    }

    /// Spawns a task that calls [`check_for_changes`](Self::check_for_changes)
    /// every `period` until `cancel` fires.
    pub fn spawn_background_refresh(
        self: &Arc<Self>,
        period: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let source = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // first tick completes immediately
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        if let Some(report) = source.check_for_changes().await {
                            log::info!(
                                "Disposable domains reloaded: {} domains (generation {})",
                                report.domains,
                                report.generation
                            );
                        }
                    }
                }
            }

            log::debug!("Disposable list refresher stopped");
        })
    }

    async fn refresh_locked(&self, state: &mut SourceState, force: bool) -> RefreshReport {
        let stale = force
            || self
                .store
                .is_stale(&self.source_url, self.refresh_interval)
                .await;

        let downloaded = stale && self.download_locked(state).await;
        self.rebuild_locked(state, downloaded).await
    }

    async fn download_locked(&self, state: &mut SourceState) -> bool {
        log::info!("Downloading disposable domain list from {}", self.source_url);

        match self.store.download(&self.client, &self.source_url).await {
            Ok(metadata) => {
                log::info!(
                    "Downloaded {} disposable domains from {}",
                    metadata.domains,
                    metadata.source
                );
                self.stats.increment_info(InfoType::DisposableListDownloaded);
                state.retry_download_after = None;
                true
            }
            Err(e) => {
                log::warn!("Keeping cached disposable list: {e}");
                self.stats.increment_error(ErrorType::DisposableListFetchError);
                state.retry_download_after = Some(Instant::now() + DISPOSABLE_FETCH_RETRY_INTERVAL);
                false
            }
        }
    }

    fn list_files(&self, state: &SourceState) -> Vec<PathBuf> {
        let mut files = vec![self.store.remote_list_path(), self.store.custom_list_path()];
        if let Some(path) = &state.custom_override {
            files.push(path.clone());
        }
        files
    }

    async fn files_changed(&self, state: &SourceState) -> bool {
        for (path, stamp) in &state.loaded_files {
            if file_stamp(path).await != *stamp {
                log::debug!("Disposable list {} changed", path.display());
                return true;
            }
        }
        false
    }

    async fn rebuild_locked(&self, state: &mut SourceState, downloaded: bool) -> RefreshReport {
        let files = self.list_files(state);
        let mut domains = HashSet::new();
        let mut loaded_files = Vec::with_capacity(files.len());

        for path in files {
            // stamp before reading so an edit during the read is seen next time
            let stamp = file_stamp(&path).await;
            self.load_file(&path, &mut domains).await;
            loaded_files.push((path, stamp));
        }

        let generation = self.snapshot.load().generation() + 1;
        let snapshot = DisposableSet::new(domains, generation);
        let count = snapshot.len();
        self.snapshot.store(Arc::new(snapshot));
        state.loaded_files = loaded_files;
        self.stats.increment_info(InfoType::DisposableSnapshotRebuilt);

        log::debug!("Published disposable snapshot {generation} with {count} domains");

        RefreshReport {
            downloaded,
            domains: count,
            generation,
        }
    }

    async fn load_file(&self, path: &Path, domains: &mut HashSet<Box<str>>) {
        match read_list_file(path, domains).await {
            Ok(count) => log::debug!("Read {count} entries from {}", path.display()),
            Err(e) => {
                log::warn!("Skipping disposable list: {e}");
                self.stats.increment_error(ErrorType::DisposableListReadError);
            }
        }
    }

    fn current_report(&self, downloaded: bool) -> RefreshReport {
        let snapshot = self.snapshot.load();
        RefreshReport {
            downloaded,
            domains: snapshot.len(),
            generation: snapshot.generation(),
        }
    }
}
