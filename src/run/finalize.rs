//! Run finalization and cleanup.

use log::warn;

use crate::app::{log_progress, print_error_statistics, print_summary, shutdown_gracefully};
use crate::error_handling::{PipelineError, RunError};

use super::resources::RunFinish;
use super::ValidationReport;

/// Finalize a run and produce the final report.
///
/// This function performs the following steps:
/// 1. Stop the progress logger and the list refresher
/// 2. Commit the staged result files, or discard them if the run did not complete
/// 3. Print statistics
///
/// # Errors
///
/// - `RunError::Cancelled` if the pipeline was cancelled
/// - `RunError::InputUnavailable` if the input failed partway through
/// - `RunError::OutputUnavailable` if a sink failed or the result files could not be committed
pub async fn finalize_run(
    finish: RunFinish,
    outcome: Result<crate::pipeline::RunSummary, PipelineError>,
) -> Result<ValidationReport, RunError> {
    let RunFinish {
        input_path,
        output,
        stats,
        disposable,
        progress,
        background,
        background_tasks,
    } = finish;

    shutdown_gracefully(background, background_tasks).await;

    let snapshot = progress.snapshot();
    log_progress(&snapshot);

    let summary = match outcome {
        Ok(summary) => summary,
        Err(e) => {
            let output_dir = output.dir().to_path_buf();
            if let Err(cleanup) = output.discard().await {
                warn!("Failed to remove partial output: {cleanup}");
            }
            print_error_statistics(&stats);
            return Err(match e {
                PipelineError::Cancelled => RunError::Cancelled,
                PipelineError::Input(source) => RunError::InputUnavailable {
                    path: input_path,
                    source,
                },
                PipelineError::Sink { source, .. } => RunError::OutputUnavailable {
                    path: output_dir,
                    source,
                },
            });
        }
    };

    let output_dir = output.dir().to_path_buf();
    let output_files = output
        .commit()
        .await
        .map_err(|source| RunError::OutputUnavailable {
            path: output_dir.clone(),
            source,
        })?;

    print_error_statistics(&stats);
    print_summary(&summary.progress);

    let p = summary.progress;
    Ok(ValidationReport {
        total: p.processed,
        valid: p.valid,
        invalid_format: p.invalid_format,
        disposable: p.disposable,
        missing_mx: p.missing_mx,
        output_dir,
        output_files,
        disposable_domains: disposable.len(),
        elapsed_seconds: p.elapsed.as_secs_f64(),
    })
}
