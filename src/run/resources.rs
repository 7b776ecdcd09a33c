//! Run resources and state management.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::disposable::DisposableDomainSource;
use crate::error_handling::ProcessingStats;
use crate::input::AddressStream;
use crate::pipeline::{CategorySinks, OutputGuard, ProgressCounters, ValidationPipeline};

/// Everything a run needs once initialization has succeeded.
pub struct RunResources {
    /// Worker pool
    pub pipeline: ValidationPipeline,
    /// Lazy address input
    pub input: AddressStream,
    /// Staged result files
    pub sinks: CategorySinks,
    /// Live counters shared with the progress logger
    pub progress: Arc<ProgressCounters>,
    /// State consumed by finalization
    pub finish: RunFinish,
}

/// The part of [`RunResources`] that outlives the pipeline.
pub struct RunFinish {
    /// Input path, reported if reading fails mid-run
    pub input_path: PathBuf,
    /// Output directory bookkeeping
    pub output: OutputGuard,
    /// Error and info counters
    pub stats: Arc<ProcessingStats>,
    /// Disposable-domain source used by the run
    pub disposable: Arc<DisposableDomainSource>,
    /// Live counters
    pub progress: Arc<ProgressCounters>,
    /// Stops the progress logger and the list refresher
    pub background: CancellationToken,
    /// Progress logger and list refresher
    pub background_tasks: Vec<JoinHandle<()>>,
}
