//! Tracking state and per-tick outcomes.

use nostr::Timestamp;
use serde::{Deserialize, Serialize};

use crate::relay::PublishResult;

/// Lifecycle state of the tracking controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingState {
    /// No timer, no position subscription.
    #[default]
    Stopped,
    /// Sampling positions and publishing on every tick.
    Tracking,
}

impl TrackingState {
    /// Returns true for [`TrackingState::Tracking`].
    #[must_use]
    pub const fn is_tracking(self) -> bool {
        matches!(self, Self::Tracking)
    }
}

/// What a single publish cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The controller was stopped; nothing ran.
    NotTracking,
    /// Another cycle was still in flight; this one was dropped.
    Skipped,
    /// No position has been received yet.
    NoPosition,
    /// The cycle ran to completion (or until stopped).
    Completed(TickReport),
}

impl TickOutcome {
    /// Returns the report of a completed cycle.
    #[must_use]
    pub const fn report(&self) -> Option<&TickReport> {
        match self {
            Self::Completed(report) => Some(report),
            _ => None,
        }
    }
}

/// Summary of a completed publish cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Wall-clock time the cycle ran at; `created_at` of every record.
    pub tick_time: Timestamp,
    /// One entry per record that was signed and sent.
    pub results: Vec<PublishResult>,
    /// Records dropped because signing failed.
    pub signing_failures: usize,
}

impl TickReport {
    /// Creates an empty report for a cycle at `tick_time`.
    #[must_use]
    pub const fn new(tick_time: Timestamp) -> Self {
        Self {
            tick_time,
            results: Vec::new(),
            signing_failures: 0,
        }
    }

    /// Number of records accepted by at least one relay.
    #[must_use]
    pub fn published_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    /// Returns true if any record was accepted.
    #[must_use]
    pub fn any_published(&self) -> bool {
        self.results.iter().any(PublishResult::is_success)
    }
}
