//! Composition root.
//!
//! [`Sentinel`] builds one of each component and wires the external
//! collaborators into them. Hosts create a single instance and keep it for
//! the lifetime of the process.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{ConfigStore, TrackingConfig};
use crate::location::{BroadcastPositionSource, PositionSource};
use crate::nostr::{Credentials, DelegatedSigner, ReportBuilder};
use crate::relay::{
    NostrRelayTransport, RelayPublisher, RelayStore, RelayTransport, RetryPolicy,
    DEFAULT_SEND_TIMEOUT,
};
use crate::storage::{KeyValueStore, MemoryStore};
use crate::tracking::{Clock, SystemClock, TickOutcome, TrackingController, TrackingResult};

/// Core interface for Sentinel functionality.
///
/// # Examples
///
/// ```
/// use sentinel_core::Sentinel;
///
/// # let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
/// # rt.block_on(async {
/// let sentinel = Sentinel::builder().build();
/// assert!(!sentinel.tracking().is_tracking());
/// assert_eq!(sentinel.config().get().interval_secs, 60);
/// # });
/// ```
pub struct Sentinel {
    config: Arc<ConfigStore>,
    relays: Arc<RelayStore>,
    tracking: TrackingController,
}

impl Sentinel {
    /// Starts configuring a new instance.
    #[must_use]
    pub fn builder() -> SentinelBuilder {
        SentinelBuilder::default()
    }

    /// Configuration store.
    #[must_use]
    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// Relay set store.
    #[must_use]
    pub fn relays(&self) -> &RelayStore {
        &self.relays
    }

    /// Tracking controller.
    #[must_use]
    pub const fn tracking(&self) -> &TrackingController {
        &self.tracking
    }

    /// Replaces the tracking configuration. Takes effect on the next cycle.
    pub fn update_config(&self, config: TrackingConfig) {
        self.config.set(config);
    }

    /// Replaces the relay set. Takes effect on the next cycle.
    pub fn update_relays(&self, relays: Vec<String>) {
        self.relays.set(relays);
    }

    /// Starts tracking.
    ///
    /// # Errors
    ///
    /// Returns an error if the position source refuses to start.
    pub async fn start(&self, credentials: Credentials) -> TrackingResult<()> {
        self.tracking.start(credentials).await
    }

    /// Stops tracking.
    pub async fn stop(&self) {
        self.tracking.stop().await;
    }

    /// Publishes the latest position immediately.
    ///
    /// # Errors
    ///
    /// Returns the error that aborted the cycle.
    pub async fn publish_now(&self) -> TrackingResult<TickOutcome> {
        self.tracking.tick_now().await
    }

    /// Supplies a delegated signer to the running session.
    pub async fn attach_signer(&self, signer: Arc<dyn DelegatedSigner>) -> bool {
        self.tracking.attach_signer(signer).await
    }
}

impl std::fmt::Debug for Sentinel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sentinel")
            .field("config", &self.config)
            .field("relays", &self.relays)
            .field("tracking", &self.tracking)
            .finish()
    }
}

/// Builder for [`Sentinel`].
///
/// Every collaborator has a default: in-memory storage, a
/// [`BroadcastPositionSource`], a `nostr-sdk` relay transport, no retry and
/// the system clock.
#[derive(Default)]
pub struct SentinelBuilder {
    storage: Option<Arc<dyn KeyValueStore>>,
    source: Option<Arc<dyn PositionSource>>,
    transport: Option<Arc<dyn RelayTransport>>,
    send_timeout: Option<Duration>,
    retry: RetryPolicy,
    builder: Option<ReportBuilder>,
    clock: Option<Arc<dyn Clock>>,
}

impl SentinelBuilder {
    /// Persists config and relays in `storage`.
    #[must_use]
    pub fn storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Reads positions from `source`.
    #[must_use]
    pub fn position_source(mut self, source: Arc<dyn PositionSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Publishes through `transport` instead of the default `nostr-sdk` one.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn RelayTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the per-relay send timeout of the default transport.
    #[must_use]
    pub const fn send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = Some(timeout);
        self
    }

    /// Sets the per-relay retry policy.
    #[must_use]
    pub const fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Builds reports with `builder` (for a custom cipher).
    #[must_use]
    pub fn report_builder(mut self, builder: ReportBuilder) -> Self {
        self.builder = Some(builder);
        self
    }

    /// Stamps records with `clock`.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Loads persisted state and wires the components.
    #[must_use]
    pub fn build(self) -> Sentinel {
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let source = self
            .source
            .unwrap_or_else(|| Arc::new(BroadcastPositionSource::new()));
        let timeout = self.send_timeout.unwrap_or(DEFAULT_SEND_TIMEOUT);
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(NostrRelayTransport::new(timeout)));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        let config = Arc::new(ConfigStore::load(Arc::clone(&storage)));
        let relays = Arc::new(RelayStore::load(storage));
        let publisher = RelayPublisher::new(transport).with_retry(self.retry);
        let tracking = TrackingController::with_builder(
            Arc::clone(&config),
            Arc::clone(&relays),
            source,
            self.builder.unwrap_or_default(),
            publisher,
            clock,
        );

        Sentinel {
            config,
            relays,
            tracking,
        }
    }
}
