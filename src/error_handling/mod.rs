//! Error handling and processing statistics.
//!
//! This module provides:
//! - Error type definitions for each boundary (DNS, disposable lists, sinks, run)
//! - Processing statistics tracking (errors and info metrics)
//!
//! Per-address failures never escape the pipeline; they are folded into a
//! rejection reason and counted here. Only [`RunError`] reaches the caller.

mod stats;
mod types;

// Re-export public API
pub use stats::ProcessingStats;
pub use types::{
    DnsLookupError, ErrorType, InfoType, InitializationError, PipelineError, RunError,
    SourceError,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use strum::IntoEnumIterator;

    #[test]
    fn test_processing_stats_initialization() {
        let stats = ProcessingStats::new();
        for error_type in ErrorType::iter() {
            assert_eq!(stats.get_error_count(error_type), 0);
        }
        for info_type in InfoType::iter() {
            assert_eq!(stats.get_info_count(info_type), 0);
        }
    }

    #[test]
    fn test_processing_stats_increment() {
        let stats = ProcessingStats::new();
        stats.increment_error(ErrorType::DnsMxTimeout);
        assert_eq!(stats.get_error_count(ErrorType::DnsMxTimeout), 1);

        stats.increment_info(InfoType::DnsMxRetry);
        assert_eq!(stats.get_info_count(InfoType::DnsMxRetry), 1);
    }

    #[test]
    fn test_processing_stats_totals() {
        let stats = ProcessingStats::new();
        stats.increment_error(ErrorType::DnsMxTimeout);
        stats.increment_error(ErrorType::DisposableListFetchError);
        stats.increment_info(InfoType::DomainCacheCleared);

        assert_eq!(stats.total_errors(), 2);
        assert_eq!(stats.total_info(), 1);
    }

    #[test]
    fn test_processing_stats_concurrent_increments() {
        let stats = Arc::new(ProcessingStats::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = Arc::clone(&stats);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        stats.increment_error(ErrorType::DnsMxTransientError);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(stats.get_error_count(ErrorType::DnsMxTransientError), 8000);
    }
}
