//! Live progress counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use super::outcome::Category;

/// Counters updated by the workers as addresses are classified.
///
/// All counts only grow. Read them through [`snapshot`](Self::snapshot).
#[derive(Debug)]
pub struct ProgressCounters {
    by_category: [AtomicU64; 4],
    expected_total: Option<u64>,
    started: Instant,
}

impl ProgressCounters {
    /// `expected_total` is only used for the completion percentage.
    pub fn new(expected_total: Option<u64>) -> Self {
        Self {
            by_category: Default::default(),
            expected_total,
            started: Instant::now(),
        }
    }

    pub fn record(&self, category: Category) {
        self.by_category[category.index()].fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let count = |category: Category| self.by_category[category.index()].load(Ordering::SeqCst);
        let valid = count(Category::Valid);
        let invalid_format = count(Category::InvalidFormat);
        let disposable = count(Category::Disposable);
        let missing_mx = count(Category::MissingMx);
        ProgressSnapshot {
            // always the sum of the categories
            processed: valid + invalid_format + disposable + missing_mx,
            valid,
            invalid_format,
            disposable,
            missing_mx,
            expected_total: self.expected_total,
            elapsed: self.started.elapsed(),
        }
    }
}

/// Point-in-time copy of [`ProgressCounters`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub processed: u64,
    pub valid: u64,
    pub invalid_format: u64,
    pub disposable: u64,
    pub missing_mx: u64,
    pub expected_total: Option<u64>,
    pub elapsed: Duration,
}

impl ProgressSnapshot {
    /// Share of the expected total processed so far, in percent.
    pub fn percent(&self) -> Option<f64> {
        match self.expected_total {
            Some(total) if total > 0 => Some((self.processed as f64 / total as f64 * 100.0).min(100.0)),
            _ => None,
        }
    }

    /// Addresses per second since the run started.
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.processed as f64 / secs
        } else {
            0.0
        }
    }

    pub fn count(&self, category: Category) -> u64 {
        match category {
            Category::Valid => self.valid,
            Category::InvalidFormat => self.invalid_format,
            Category::Disposable => self.disposable,
            Category::MissingMx => self.missing_mx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_sum_to_processed() {
        let counters = ProgressCounters::new(Some(10));
        counters.record(Category::Valid);
        counters.record(Category::Valid);
        counters.record(Category::Disposable);
        counters.record(Category::MissingMx);
        counters.record(Category::InvalidFormat);

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.processed, 5);
        assert_eq!(snapshot.valid, 2);
        let sum: u64 = Category::ALL.iter().map(|c| snapshot.count(*c)).sum();
        assert_eq!(sum, snapshot.processed);
        assert_eq!(snapshot.percent(), Some(50.0));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_snapshots_stay_consistent_under_concurrent_records() {
        let counters = std::sync::Arc::new(ProgressCounters::new(None));
        let writers: Vec<_> = Category::ALL
            .iter()
            .map(|&category| {
                let counters = std::sync::Arc::clone(&counters);
                tokio::spawn(async move {
                    for _ in 0..5_000 {
                        counters.record(category);
                    }
                })
            })
            .collect();

        for _ in 0..1_000 {
            let snapshot = counters.snapshot();
            let sum: u64 = Category::ALL.iter().map(|c| snapshot.count(*c)).sum();
            assert_eq!(sum, snapshot.processed);
            tokio::task::yield_now().await;
        }
        for writer in writers {
            writer.await.unwrap();
        }
        assert_eq!(counters.snapshot().processed, 20_000);
    }

    #[test]
    fn test_percent_without_hint() {
        let counters = ProgressCounters::new(None);
        counters.record(Category::Valid);
        assert_eq!(counters.snapshot().percent(), None);
        assert_eq!(ProgressCounters::new(Some(0)).snapshot().percent(), None);
    }

    #[test]
    fn test_percent_is_capped() {
        let counters = ProgressCounters::new(Some(1));
        counters.record(Category::Valid);
        counters.record(Category::Valid);
        assert_eq!(counters.snapshot().percent(), Some(100.0));
    }
}
