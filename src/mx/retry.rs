//! Retry delays for MX lookups.

use std::time::Duration;

use rand::Rng;

/// Delays between MX attempts: `base + U(0, jitter)` for each retry.
///
/// Yields `max_attempts - 1` delays, so the first attempt plus the retries
/// never exceed `max_attempts`. The jitter keeps many workers that failed
/// together from retrying together.
pub(crate) fn jittered_delays(
    base: Duration,
    jitter: Duration,
    max_attempts: usize,
) -> impl Iterator<Item = Duration> + Send {
    let jitter_ms = u64::try_from(jitter.as_millis()).unwrap_or(u64::MAX);
    std::iter::repeat_with(move || {
        let extra = if jitter_ms == 0 {
            0
        } else {
            rand::rng().random_range(0..=jitter_ms)
        };
        base + Duration::from_millis(extra)
    })
    .take(max_attempts.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jittered_delays_count() {
        let base = Duration::from_secs(5);
        let jitter = Duration::from_secs(2);
        assert_eq!(jittered_delays(base, jitter, 2).count(), 1);
        assert_eq!(jittered_delays(base, jitter, 4).count(), 3);
        assert_eq!(jittered_delays(base, jitter, 1).count(), 0);
        assert_eq!(jittered_delays(base, jitter, 0).count(), 0);
    }

    #[test]
    fn test_jittered_delays_within_bounds() {
        let base = Duration::from_secs(5);
        let jitter = Duration::from_secs(2);
        for delay in jittered_delays(base, jitter, 200) {
            assert!(delay >= base);
            assert!(delay <= base + jitter);
        }
    }

    #[test]
    fn test_jittered_delays_without_jitter() {
        let base = Duration::from_millis(250);
        assert!(jittered_delays(base, Duration::ZERO, 5).all(|d| d == base));
    }
}
