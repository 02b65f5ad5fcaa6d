//! Tracking configuration.
//!
//! [`TrackingConfig`] carries every user-controlled knob of the publish
//! pipeline; [`ConfigStore`] holds the current value, persists it through a
//! [`KeyValueStore`](crate::storage::KeyValueStore) and notifies subscribers.
//!
//! Configuration changes take effect on the next tick: the tracking
//! controller reads a fresh snapshot at the start of every cycle.

mod error;
mod store;
mod types;

pub use error::ConfigError;
pub use store::{ConfigStore, CONFIG_STORAGE_KEY};
pub use types::{
    TrackingConfig, DEFAULT_D_TAG, DEFAULT_EXPIRATION_SECS, DEFAULT_INTERVAL_SECS,
    DEFAULT_PRECISION, MAX_INTERVAL_SECS,
};
