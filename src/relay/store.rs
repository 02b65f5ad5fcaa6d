//! Persistent, observable relay set.

use std::sync::Arc;

use crate::observable::{Observable, SubscriptionToken};
use crate::storage::{load_json, save_json, KeyValueStore};

/// Storage key for the relay list blob.
pub const RELAYS_STORAGE_KEY: &str = "sentinel-relays";

/// Relay used when nothing has been configured.
pub const DEFAULT_RELAY: &str = "wss://zooid.atlantislabs.space";

/// Returns true if `url` (already trimmed) uses a websocket scheme.
#[must_use]
pub fn is_valid_relay_url(url: &str) -> bool {
    url.starts_with("wss://") || url.starts_with("ws://")
}

/// Trims entries, drops anything that is not `ws://` or `wss://`, and
/// removes duplicates while keeping first-seen order.
fn sanitize<I, S>(relays: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for relay in relays {
        let relay = relay.as_ref().trim();
        if !is_valid_relay_url(relay) {
            if !relay.is_empty() {
                log::debug!("Dropping relay with unsupported scheme: {relay}");
            }
            continue;
        }
        if !out.iter().any(|r| r == relay) {
            out.push(relay.to_string());
        }
    }
    out
}

/// Holds the list of relays records are published to.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use sentinel_core::relay::RelayStore;
/// use sentinel_core::storage::MemoryStore;
///
/// let store = RelayStore::load(Arc::new(MemoryStore::new()));
/// assert_eq!(store.get(), vec!["wss://zooid.atlantislabs.space"]);
///
/// store.set(vec![" wss://relay.a ".into(), "https://nope".into()]);
/// assert_eq!(store.get(), vec!["wss://relay.a"]);
/// ```
pub struct RelayStore {
    storage: Arc<dyn KeyValueStore>,
    current: Observable<Vec<String>>,
}

impl RelayStore {
    /// Loads the relay list from `storage`, falling back to
    /// [`DEFAULT_RELAY`] when absent or unreadable.
    #[must_use]
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let relays = load_json::<Vec<String>>(storage.as_ref(), RELAYS_STORAGE_KEY)
            .map(sanitize)
            .unwrap_or_else(|| vec![DEFAULT_RELAY.to_string()]);

        Self {
            storage,
            current: Observable::new(relays),
        }
    }

    /// Returns a snapshot of the relay list.
    #[must_use]
    pub fn get(&self) -> Vec<String> {
        self.current.get()
    }

    /// Replaces the relay list.
    ///
    /// Entries without a `ws://` or `wss://` scheme are dropped silently.
    /// An empty result is stored as-is: tracking then publishes nowhere.
    pub fn set(&self, relays: Vec<String>) {
        let relays = sanitize(relays);
        save_json(self.storage.as_ref(), RELAYS_STORAGE_KEY, &relays);
        log::debug!("Relay set updated ({} relays)", relays.len());
        self.current.set(relays);
    }

    /// Subscribes to relay list changes. The current value is delivered
    /// immediately.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionToken
    where
        F: Fn(&Vec<String>) + Send + Sync + 'static,
    {
        self.current.subscribe(handler)
    }

    /// Removes a subscriber.
    pub fn unsubscribe(&self, token: SubscriptionToken) -> bool {
        self.current.unsubscribe(token)
    }
}

impl std::fmt::Debug for RelayStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayStore")
            .field("relays", &self.current.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn fresh_load_uses_default_relay() {
        let store = RelayStore::load(Arc::new(MemoryStore::new()));
        assert_eq!(store.get(), vec![DEFAULT_RELAY.to_string()]);
    }

    #[test]
    fn set_filters_schemes_and_trims() {
        let store = RelayStore::load(Arc::new(MemoryStore::new()));
        store.set(vec![
            "wss://a.example.com".to_string(),
            "  ws://localhost:7777  ".to_string(),
            "https://not-a-relay.example.com".to_string(),
            String::new(),
            "relay.example.com".to_string(),
        ]);
        assert_eq!(
            store.get(),
            vec!["wss://a.example.com", "ws://localhost:7777"]
        );
    }

    #[test]
    fn set_removes_duplicates() {
        let store = RelayStore::load(Arc::new(MemoryStore::new()));
        store.set(vec![
            "wss://a.example.com".to_string(),
            "wss://b.example.com".to_string(),
            " wss://a.example.com".to_string(),
        ]);
        assert_eq!(store.get(), vec!["wss://a.example.com", "wss://b.example.com"]);
    }

    #[test]
    fn relays_survive_reload() {
        let storage = Arc::new(MemoryStore::new());
        RelayStore::load(storage.clone()).set(vec!["wss://a.example.com".to_string()]);
        assert_eq!(RelayStore::load(storage).get(), vec!["wss://a.example.com"]);
    }

    #[test]
    fn empty_set_is_kept() {
        let storage = Arc::new(MemoryStore::new());
        RelayStore::load(storage.clone()).set(Vec::new());
        assert!(RelayStore::load(storage).get().is_empty());
    }

    #[test]
    fn stored_invalid_entries_are_dropped_on_load() {
        let storage = Arc::new(MemoryStore::new());
        storage
            .set(RELAYS_STORAGE_KEY, r#"["http://x","wss://ok.example.com"]"#)
            .unwrap();
        assert_eq!(RelayStore::load(storage).get(), vec!["wss://ok.example.com"]);
    }

    #[test]
    fn corrupt_blob_falls_back_to_default() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(RELAYS_STORAGE_KEY, "not json").unwrap();
        assert_eq!(RelayStore::load(storage).get(), vec![DEFAULT_RELAY.to_string()]);
    }

    #[test]
    fn url_scheme_check() {
        assert!(is_valid_relay_url("wss://relay.damus.io"));
        assert!(is_valid_relay_url("ws://127.0.0.1:7000"));
        assert!(!is_valid_relay_url("http://relay.damus.io"));
        assert!(!is_valid_relay_url(" wss://untrimmed"));
    }
}
