//! Run resource initialization.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use log::info;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::app::log_progress;
use crate::cache::DomainStatusCache;
use crate::config::{Config, DISPOSABLE_FETCH_TIMEOUT, DISPOSABLE_WATCH_INTERVAL};
use crate::disposable::{DisposableDomainSource, DisposableSettings};
use crate::error_handling::{ProcessingStats, RunError};
use crate::initialization::init_client;
use crate::input::open_input;
use crate::mx::{MxLookup, MxResolver, MxSettings};
use crate::pipeline::{OutputGuard, PipelineSettings, ProgressCounters, ValidationPipeline};

use super::resources::{RunFinish, RunResources};

/// Initialize all resources needed for a run.
///
/// This function performs the following steps:
/// 1. Validate the configuration
/// 2. Open (and count) the input
/// 3. Prepare the output directory and stage the result files
/// 4. Load the disposable-domain lists, downloading the remote list if stale
/// 5. Build the MX resolver, domain cache and pipeline
/// 6. Start the progress logger and the list refresher
///
/// Failures before step 3 leave the filesystem untouched; later failures
/// remove whatever step 3 created.
///
/// # Errors
///
/// - `RunError::Initialization` for an invalid configuration or HTTP client failure
/// - `RunError::InputUnavailable` if no input is given or it cannot be read
/// - `RunError::OutputUnavailable` if the result files cannot be created
pub async fn init_run_resources(
    config: &Config,
    lookup: Arc<dyn MxLookup>,
    cancel: CancellationToken,
) -> Result<RunResources, RunError> {
    config.validate().map_err(RunError::Initialization)?;
    let input_path = config
        .file
        .as_deref()
        .ok_or_else(|| RunError::InputUnavailable {
            path: PathBuf::new(),
            source: io::Error::new(io::ErrorKind::NotFound, "no input file given"),
        })?;

    let client = init_client(DISPOSABLE_FETCH_TIMEOUT)?;

    let (input, expected_total) = open_input(input_path).await?;

    let output_unavailable = |source| RunError::OutputUnavailable {
        path: config.output_dir.clone(),
        source,
    };
    let mut output = OutputGuard::prepare(&config.output_dir)
        .await
        .map_err(output_unavailable)?;
    let sinks = match output.file_sinks().await {
        Ok(sinks) => sinks,
        Err(e) => {
            if let Err(cleanup) = output.discard().await {
                log::warn!("Failed to clean up output directory: {cleanup}");
            }
            return Err(output_unavailable(e));
        }
    };

    let stats = Arc::new(ProcessingStats::new());

    let disposable = Arc::new(DisposableDomainSource::new(
        DisposableSettings {
            storage_dir: config.storage_dir.clone(),
            source_url: config.disposable_url.clone(),
            refresh_interval: config.refresh_interval(),
        },
        client,
        Arc::clone(&stats),
    ));
    disposable.initialize().await;
    if config.force_refresh {
        disposable.refresh(true).await;
    }
    let report = disposable.set_custom_file(config.custom_file.clone()).await;
    info!(
        "Loaded {} disposable domains (generation {})",
        report.domains, report.generation
    );

    let mx = Arc::new(MxResolver::new(
        lookup,
        MxSettings::from(config),
        Arc::clone(&stats),
        cancel,
    ));
    let cache = Arc::new(DomainStatusCache::new(
        config.cache_capacity,
        Arc::clone(&disposable),
        mx,
        Arc::clone(&stats),
    ));
    let pipeline = ValidationPipeline::new(cache, Arc::clone(&stats), PipelineSettings::from(config));

    let progress = Arc::new(ProgressCounters::new(expected_total));
    let background = CancellationToken::new();
    let background_tasks = vec![
        spawn_progress_logger(
            Arc::clone(&progress),
            Duration::from_secs(config.progress_interval_secs.max(1)),
            background.child_token(),
        ),
        disposable.spawn_background_refresh(DISPOSABLE_WATCH_INTERVAL, background.child_token()),
    ];

    Ok(RunResources {
        pipeline,
        input,
        sinks,
        progress: Arc::clone(&progress),
        finish: RunFinish {
            input_path: input_path.to_path_buf(),
            output,
            stats,
            disposable,
            progress,
            background,
            background_tasks,
        },
    })
}

fn spawn_progress_logger(
    progress: Arc<ProgressCounters>,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await;
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    log_progress(&progress.snapshot());
                }
                _ = cancel.cancelled() => {
                    break;
                }
            }
        }
    })
}
