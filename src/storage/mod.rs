//! Key-value persistence for configuration blobs.
//!
//! The core never owns a database schema of its own. Configuration and the
//! relay set are stored as JSON strings under fixed keys in whatever
//! [`KeyValueStore`] the host provides:
//!
//! ```text
//! ConfigStore ──┐
//!               ├── KeyValueStore ── MemoryStore | SqliteStore | host adapter
//! RelayStore ───┘
//! ```
//!
//! Persistence is best-effort: read and write failures are logged and
//! swallowed by the stores, never surfaced to the tracking pipeline.

mod error;
mod sqlite;

use std::collections::HashMap;
use std::sync::RwLock;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use error::{Result, StorageError};
pub use sqlite::SqliteStore;

/// Trait for string key-value persistence.
///
/// Implementations must be `Send + Sync` so a single store can back every
/// component built by the composition root.
pub trait KeyValueStore: Send + Sync {
    /// Returns the blob stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory [`KeyValueStore`].
///
/// Useful for ephemeral hosts and tests. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(data.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        data.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Loads and deserializes the blob stored under `key`.
///
/// Returns `None` when the blob is absent, unreadable or unparsable. Failures
/// are logged at `warn` level.
pub(crate) fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let blob = match store.get(key) {
        Ok(Some(blob)) => blob,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("Failed to read {key} from storage: {e}");
            return None;
        }
    };

    match serde_json::from_str(&blob) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring unparsable {key} blob: {e}");
            None
        }
    }
}

/// Serializes `value` and stores it under `key`, logging any failure.
pub(crate) fn save_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(StorageError::from)
        .and_then(|blob| store.set(key, &blob));

    if let Err(e) = result {
        log::warn!("Failed to persist {key}: {e}");
    }
}
