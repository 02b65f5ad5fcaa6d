//! Persistent, observable holder of the current [`TrackingConfig`].

use std::sync::Arc;

use super::types::TrackingConfig;
use crate::observable::{Observable, SubscriptionToken};
use crate::storage::{load_json, save_json, KeyValueStore};

/// Storage key for the tracking configuration blob.
pub const CONFIG_STORAGE_KEY: &str = "sentinel-tracking-config";

/// Holds the current tracking configuration.
///
/// Changes only through [`set`](Self::set), which replaces the whole value,
/// persists it and notifies subscribers. Callers merge individual fields
/// themselves before calling `set`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use sentinel_core::config::{ConfigStore, TrackingConfig};
/// use sentinel_core::storage::MemoryStore;
///
/// let store = ConfigStore::load(Arc::new(MemoryStore::new()));
/// assert_eq!(store.get(), TrackingConfig::default());
///
/// store.set(TrackingConfig::default().with_d_tag("car"));
/// assert_eq!(store.get().d_tag, "car");
/// ```
pub struct ConfigStore {
    storage: Arc<dyn KeyValueStore>,
    current: Observable<TrackingConfig>,
}

impl ConfigStore {
    /// Loads the configuration from `storage`.
    ///
    /// Missing fields take their defaults. An absent or unparsable blob
    /// yields [`TrackingConfig::default`]; the failure is logged, never
    /// returned.
    #[must_use]
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let config = load_json::<TrackingConfig>(storage.as_ref(), CONFIG_STORAGE_KEY)
            .map(|c| c.normalized())
            .unwrap_or_default();

        Self {
            storage,
            current: Observable::new(config),
        }
    }

    /// Returns a snapshot of the current configuration.
    #[must_use]
    pub fn get(&self) -> TrackingConfig {
        self.current.get()
    }

    /// Replaces the configuration.
    ///
    /// The value is normalized (see [`TrackingConfig::normalized`]),
    /// persisted best-effort and published to subscribers.
    pub fn set(&self, config: TrackingConfig) {
        let config = config.normalized();
        save_json(self.storage.as_ref(), CONFIG_STORAGE_KEY, &config);
        log::debug!(
            "Tracking config updated (interval {}s, precision {}, encrypted {})",
            config.interval_secs,
            config.precision,
            config.encrypted
        );
        self.current.set(config);
    }

    /// Subscribes to configuration changes. The current value is delivered
    /// immediately.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionToken
    where
        F: Fn(&TrackingConfig) + Send + Sync + 'static,
    {
        self.current.subscribe(handler)
    }

    /// Removes a subscriber.
    pub fn unsubscribe(&self, token: SubscriptionToken) -> bool {
        self.current.unsubscribe(token)
    }
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("current", &self.current.get())
            .finish_non_exhaustive()
    }
}
