//! Publish outcome and retry configuration.

use std::time::Duration;

use nostr::EventId;

use super::error::RelayError;

/// Result of publishing one event to a relay set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishResult {
    /// The event ID that was published.
    pub event_id: EventId,
    /// Relays that accepted the event.
    pub accepted_by: Vec<String>,
    /// Relays that failed, with the error each produced.
    pub failed: Vec<(String, RelayError)>,
}

impl PublishResult {
    /// Creates an empty result for `event_id`.
    #[must_use]
    pub const fn new(event_id: EventId) -> Self {
        Self {
            event_id,
            accepted_by: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Returns true if at least one relay accepted the event.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !self.accepted_by.is_empty()
    }

    /// Returns true if some relays accepted and others failed.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        !self.accepted_by.is_empty() && !self.failed.is_empty()
    }

    /// Returns the number of successful relays.
    #[must_use]
    pub const fn success_count(&self) -> usize {
        self.accepted_by.len()
    }

    /// Returns the total number of relays attempted.
    #[must_use]
    pub const fn total_attempted(&self) -> usize {
        self.accepted_by.len() + self.failed.len()
    }
}

/// Per-relay retry behaviour for a single publish.
///
/// The default performs exactly one attempt. With retries enabled, the
/// delay before attempt `n + 1` is `initial_backoff * 2^(n - 1)`, capped at
/// `max_backoff`. Only [transient](RelayError::is_transient) errors are
/// retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per relay, including the first. Always at least 1.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_backoff: Duration,
    /// Upper bound on any single delay.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl RetryPolicy {
    /// One attempt, no retry.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Bounded exponential backoff.
    ///
    /// A `max_attempts` of zero is treated as one.
    #[must_use]
    pub fn exponential(max_attempts: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            max_backoff: max_backoff.max(initial_backoff),
        }
    }

    /// Returns the delay to wait after failed attempt number `attempt`
    /// (1-based).
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}
