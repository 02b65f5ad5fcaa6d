//! Position source abstraction.
//!
//! The platform layer (GPS, browser geolocation, a replay file, ...) is an
//! external collaborator. It implements [`PositionSource`] and calls every
//! registered callback with each reading. A `None` reading signals a
//! transient read failure and is never fatal.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use super::error::Result;
use super::types::Position;

/// Callback invoked with every reading.
pub type PositionCallback = Arc<dyn Fn(Option<Position>) + Send + Sync>;

/// Handle identifying one subscription to a [`PositionSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchHandle(u64);

impl WatchHandle {
    /// Creates a handle from a raw id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Trait for platform position providers.
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Registers a callback and starts delivering readings to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform refuses to start watching.
    async fn start_watching(&self, on_update: PositionCallback) -> Result<WatchHandle>;

    /// Stops delivering to one subscriber, or to all of them if `handle` is
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform watch cannot be cleared.
    async fn stop_watching(&self, handle: Option<WatchHandle>) -> Result<()>;
}

/// In-process [`PositionSource`] that fans readings out to subscribers.
///
/// Hosts push readings with [`push`](Self::push); delivery happens on the
/// caller's thread, in push order.
///
/// # Example
///
/// ```
/// use sentinel_core::location::{BroadcastPositionSource, Position};
///
/// let source = BroadcastPositionSource::new();
/// source.push(Some(Position::new(60.17, 24.94).unwrap()));
/// assert_eq!(source.subscriber_count(), 0);
/// ```
#[derive(Default)]
pub struct BroadcastPositionSource {
    callbacks: Mutex<BTreeMap<WatchHandle, PositionCallback>>,
    next_id: AtomicU64,
}

impl BroadcastPositionSource {
    /// Creates a source with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers a reading to every current subscriber.
    pub fn push(&self, reading: Option<Position>) {
        let callbacks: Vec<PositionCallback> = self
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        for callback in callbacks {
            callback(reading);
        }
    }

    /// Returns the number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl std::fmt::Debug for BroadcastPositionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastPositionSource")
            .field("subscribers", &self.subscriber_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PositionSource for BroadcastPositionSource {
    async fn start_watching(&self, on_update: PositionCallback) -> Result<WatchHandle> {
        let handle = WatchHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(handle, on_update);
        Ok(handle)
    }

    async fn stop_watching(&self, handle: Option<WatchHandle>) -> Result<()> {
        let mut callbacks = self
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match handle {
            Some(handle) => {
                callbacks.remove(&handle);
            }
            None => callbacks.clear(),
        }
        Ok(())
    }
}
