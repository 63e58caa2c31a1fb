//! Retry backoff schedule
//!
//! Pure functions, no state: maps a retry index to a delay. The attempt
//! budget is deliberately small and fixed - the handshake either succeeds
//! within a few seconds or the caller gives up until the next trigger.

use std::time::Duration;

/// Scheduled delays between handshake attempts (exponential, no jitter).
pub const DEFAULT_RETRY_DELAYS: [Duration; 3] =
    [Duration::from_secs(1), Duration::from_secs(2), Duration::from_secs(4)];

/// Backoff schedule for the authentication handshake.
///
/// The default schedule allows 4 total attempts (1 initial + 3 retries)
/// with 1s, 2s, 4s delays between them. Custom delays are only intended
/// for tests that exercise the loop against real time.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    delays: [Duration; 3],
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self { delays: DEFAULT_RETRY_DELAYS }
    }
}

impl BackoffPolicy {
    /// Total attempt budget: one initial attempt plus the scheduled retries.
    pub const MAX_ATTEMPTS: u32 = 4;

    /// Create a policy with a custom delay schedule.
    #[must_use]
    pub fn with_delays(delays: [Duration; 3]) -> Self {
        Self { delays }
    }

    /// Delay to wait before retry `retry_index` (0-based).
    ///
    /// Returns `None` once the retry budget is exhausted.
    #[must_use]
    pub fn delay_for_retry(&self, retry_index: u32) -> Option<Duration> {
        self.delays.get(retry_index as usize).copied()
    }

    /// Number of scheduled retries beyond the first attempt.
    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.delays.len() as u32
    }
}
