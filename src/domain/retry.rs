//! Backoff schedule for durable store retries.

use std::time::Duration;

use tokio_retry::strategy::ExponentialBackoff;

/// Bounded exponential retry policy.
///
/// The wait before attempt `k + 1` is `base_delay * 2^(k - 1)`, capped at
/// `max_delay`. With `max_attempts = 3` and a one second base the waits are
/// 1s and 2s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: max_delay.max(base_delay),
        }
    }

    /// Waits between consecutive attempts; yields `max_attempts - 1` delays.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + use<> {
        let base_us = u64::try_from(self.base_delay.as_micros()).unwrap_or(u64::MAX);
        let max_delay = self.max_delay;

        // from_millis(2).factor(b) yields 2b, 4b, 8b ... milliseconds. Feeding
        // the base in microseconds and dividing by 2000 gives b, 2b, 4b micros.
        ExponentialBackoff::from_millis(2)
            .factor(base_us)
            .map(move |delay| (delay / 2000).min(max_delay))
            .take(self.max_attempts.saturating_sub(1) as usize)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1), Duration::from_secs(60))
    }
}
