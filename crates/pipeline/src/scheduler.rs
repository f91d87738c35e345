//! Polling scheduler tunables and retry backoff.
//!
//! The poll loop itself lives in [`crate::manager`]; this module holds the
//! knobs and the exponential-backoff calculation applied after transient
//! status-poll failures.

use std::time::Duration;

/// Tunable parameters for the status poll loop.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between status probes for the pending job.
    pub poll_interval: Duration,
    /// Delay before the first retry after a transient poll failure.
    pub retry_initial_delay: Duration,
    /// Upper bound on the retry delay.
    pub retry_max_delay: Duration,
    /// Factor by which the retry delay grows after each failure.
    pub retry_multiplier: f64,
    /// Consecutive transient failures tolerated before the job is marked
    /// failed.
    pub max_transient_failures: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            retry_initial_delay: Duration::from_secs(1),
            retry_max_delay: Duration::from_secs(30),
            retry_multiplier: 2.0,
            max_transient_failures: 5,
        }
    }
}

/// Calculate the next retry delay from the current delay and config.
///
/// The result is clamped to [`PollConfig::retry_max_delay`].
pub fn next_retry_delay(current: Duration, config: &PollConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.retry_multiplier) as u64;
    Duration::from_millis(next_ms).min(config.retry_max_delay)
}
