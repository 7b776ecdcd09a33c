//! Statistics printing.

use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{ErrorType, InfoType, ProcessingStats};
use crate::pipeline::ProgressSnapshot;

/// Prints a one-line summary of a finished run.
pub fn print_summary(snapshot: &ProgressSnapshot) {
    info!(
        "✅ Processed {} address{} in {:.1}s: {} valid, {} invalid format, {} disposable, {} missing MX",
        snapshot.processed,
        if snapshot.processed == 1 { "" } else { "es" },
        snapshot.elapsed.as_secs_f64(),
        snapshot.valid,
        snapshot.invalid_format,
        snapshot.disposable,
        snapshot.missing_mx
    );
}

/// Prints error and info counters to the log.
pub fn print_error_statistics(error_stats: &ProcessingStats) {
    let total_errors = error_stats.total_errors();
    let total_info = error_stats.total_info();

    if total_errors > 0 {
        info!("Error Counts ({} total):", total_errors);
        for error_type in ErrorType::iter() {
            let count = error_stats.get_error_count(error_type);
            if count > 0 {
                info!("   {}: {}", error_type.as_str(), count);
            }
        }
    }

    if total_info > 0 {
        info!("Info Counts ({} total):", total_info);
        for info_type in InfoType::iter() {
            let count = error_stats.get_info_count(info_type);
            if count > 0 {
                info!("   {}: {}", info_type.as_str(), count);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_print_error_statistics_empty() {
        print_error_statistics(&ProcessingStats::new());
    }

    #[test]
    fn test_print_error_statistics_all_types() {
        let stats = ProcessingStats::new();
        for error_type in ErrorType::iter() {
            stats.increment_error(error_type);
        }
        for info_type in InfoType::iter() {
            stats.increment_info(info_type);
        }
        print_error_statistics(&stats);
    }

    #[test]
    fn test_print_summary_single_address() {
        print_summary(&ProgressSnapshot {
            processed: 1,
            valid: 1,
            invalid_format: 0,
            disposable: 0,
            missing_mx: 0,
            expected_total: Some(1),
            elapsed: Duration::from_millis(20),
        });
    }
}
