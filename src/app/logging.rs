//! Progress logging utilities.

use log::info;

use crate::pipeline::ProgressSnapshot;

/// Renders a progress line for `snapshot`.
///
/// The percentage is only shown when the input size is known.
pub fn format_progress(snapshot: &ProgressSnapshot) -> String {
    let total = match (snapshot.expected_total, snapshot.percent()) {
        (Some(total), Some(percent)) => format!("{}/{} ({:.1}%)", snapshot.processed, total, percent),
        _ => snapshot.processed.to_string(),
    };

    format!(
        "Processed {} addresses in {:.1}s (~{:.1}/sec): valid={} invalid_format={} disposable={} missing_mx={}",
        total,
        snapshot.elapsed.as_secs_f64(),
        snapshot.rate(),
        snapshot.valid,
        snapshot.invalid_format,
        snapshot.disposable,
        snapshot.missing_mx
    )
}

/// Logs one progress line.
pub fn log_progress(snapshot: &ProgressSnapshot) {
    info!("{}", format_progress(snapshot));
}
