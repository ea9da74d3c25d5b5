use std::time::Duration;

use rand::Rng;

use crate::config::RetryConfig;

/// Exponential backoff with proportional jitter.
///
/// The base delay for attempt `n` is `initial * 2^n`, clamped to `max`.
/// With a non-zero jitter fraction `j` the returned delay is drawn uniformly
/// at random from `[base * (1 - j), base * (1 + j)]`.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    initial: Duration,
    max: Duration,
    jitter: f64,
}

impl BackoffPolicy {
    pub fn new(initial: Duration, max: Duration, jitter: f64) -> Self {
        Self {
            initial,
            max,
            jitter: jitter.clamp(0.0, 1.0),
        }
    }

    pub fn from_retry(cfg: &RetryConfig) -> Self {
        Self::new(cfg.initial_backoff, cfg.max_backoff, cfg.jitter)
    }

    /// Delay before the attempt following failed attempt `attempt` (0-based).
    /// Saturates instead of overflowing for large attempt numbers.
    pub fn delay(&self, attempt: u32) -> Duration {
        let initial = duration_to_nanos(self.initial);
        let max = duration_to_nanos(self.max);
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        let base = initial.saturating_mul(factor).min(max);

        if self.jitter == 0.0 {
            return Duration::from_nanos(base);
        }

        let lo = base as f64 * (1.0 - self.jitter);
        let hi = base as f64 * (1.0 + self.jitter);
        let nanos = rand::rng().random_range(lo..=hi);
        Duration::from_nanos(nanos as u64)
    }
}

fn duration_to_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_jitter_is_exact_doubling_clamped_to_max() {
        let policy = BackoffPolicy::new(
            Duration::from_millis(100),
            Duration::from_secs(2),
            0.0,
        );
        assert_eq!(policy.delay(0), Duration::from_millis(100));
        assert_eq!(policy.delay(1), Duration::from_millis(200));
        assert_eq!(policy.delay(2), Duration::from_millis(400));
        assert_eq!(policy.delay(3), Duration::from_millis(800));
        assert_eq!(policy.delay(4), Duration::from_millis(1600));
        assert_eq!(policy.delay(5), Duration::from_secs(2));
        assert_eq!(policy.delay(6), Duration::from_secs(2));
    }

    #[test]
    fn zero_jitter_outputs_are_non_decreasing() {
        let policy = BackoffPolicy::new(
            Duration::from_millis(50),
            Duration::from_secs(5),
            0.0,
        );
        let mut prev = Duration::ZERO;
        for attempt in 0..20 {
            let d = policy.delay(attempt);
            assert!(d >= prev);
            assert!(d <= Duration::from_secs(5));
            prev = d;
        }
    }

    #[test]
    fn huge_attempt_saturates_at_max() {
        let policy = BackoffPolicy::new(
            Duration::from_millis(100),
            Duration::from_secs(2),
            0.0,
        );
        assert_eq!(policy.delay(63), Duration::from_secs(2));
        assert_eq!(policy.delay(64), Duration::from_secs(2));
        assert_eq!(policy.delay(u32::MAX), Duration::from_secs(2));
    }

    #[test]
    fn jitter_stays_within_symmetric_interval() {
        let policy = BackoffPolicy::new(
            Duration::from_millis(100),
            Duration::from_secs(10),
            0.5,
        );
        for _ in 0..100 {
            let d = policy.delay(2);
            // base 400ms, jitter 0.5 -> [200ms, 600ms]
            assert!(d >= Duration::from_millis(200));
            assert!(d <= Duration::from_millis(600));
        }
    }

    #[test]
    fn jitter_fraction_is_clamped() {
        let policy = BackoffPolicy::new(
            Duration::from_millis(100),
            Duration::from_secs(1),
            7.0,
        );
        for _ in 0..100 {
            // clamped to 1.0 -> [0, 2 * base]
            assert!(policy.delay(0) <= Duration::from_millis(200));
        }
    }

    #[test]
    fn initial_above_max_clamps_immediately() {
        let policy = BackoffPolicy::new(
            Duration::from_secs(5),
            Duration::from_secs(2),
            0.0,
        );
        assert_eq!(policy.delay(0), Duration::from_secs(2));
    }
}
