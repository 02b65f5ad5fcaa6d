//! Tracking configuration types.

use std::collections::BTreeSet;

use nostr::PublicKey;
use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::location::geohash::{MAX_PRECISION, MIN_PRECISION};

/// Default publish interval.
pub const DEFAULT_INTERVAL_SECS: u64 = 60;

/// Longest accepted publish interval (one year).
pub const MAX_INTERVAL_SECS: u64 = 365 * 24 * 60 * 60;

/// Default geohash length.
pub const DEFAULT_PRECISION: u8 = 8;

/// Default `d` tag identifier.
pub const DEFAULT_D_TAG: &str = "default";

/// Default NIP-40 expiration TTL.
pub const DEFAULT_EXPIRATION_SECS: u64 = 3600;

/// User-controlled tracking settings.
///
/// Serialized as camelCase JSON. Every field falls back to its default when
/// missing from a stored blob, so older blobs keep loading as fields are
/// added.
///
/// # Example
///
/// ```
/// use sentinel_core::config::TrackingConfig;
///
/// let config = TrackingConfig::default();
/// assert_eq!(config.interval_secs, 60);
/// assert_eq!(config.precision, 8);
/// assert!(!config.encrypted);
/// assert_eq!(config.d_tag, "default");
/// assert_eq!(config.expiration_secs, 3600);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackingConfig {
    /// Seconds between publishes.
    pub interval_secs: u64,

    /// Geohash length, 1-12.
    pub precision: u8,

    /// Publish kind 30473 (NIP-44 encrypted) instead of kind 30472.
    pub encrypted: bool,

    /// Recipients of encrypted records (hex or npub).
    pub recipient_pubkeys: BTreeSet<String>,

    /// `d` tag distinguishing concurrent streams under one identity.
    pub d_tag: String,

    /// NIP-40 expiration TTL added to the creation time.
    pub expiration_secs: u64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            precision: DEFAULT_PRECISION,
            encrypted: false,
            recipient_pubkeys: BTreeSet::new(),
            d_tag: DEFAULT_D_TAG.to_string(),
            expiration_secs: DEFAULT_EXPIRATION_SECS,
        }
    }
}

impl TrackingConfig {
    /// Switches to encrypted mode for the given recipients.
    #[must_use]
    pub fn with_recipients<I, S>(mut self, recipients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.encrypted = true;
        self.recipient_pubkeys = recipients.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the `d` tag.
    #[must_use]
    pub fn with_d_tag(mut self, d_tag: impl Into<String>) -> Self {
        self.d_tag = d_tag.into();
        self
    }

    /// Returns a copy with out-of-range values replaced.
    ///
    /// - `precision` is clamped to [1, 12]
    /// - a zero `interval_secs` or `expiration_secs` becomes the default
    /// - `interval_secs` is capped at [`MAX_INTERVAL_SECS`]
    /// - a blank `d_tag` becomes `"default"`
    /// - blank recipient entries are dropped and the rest trimmed
    #[must_use]
    pub fn normalized(&self) -> Self {
        let non_zero = |value: u64, default: u64| if value == 0 { default } else { value };
        let d_tag = self.d_tag.trim();

        Self {
            interval_secs: non_zero(self.interval_secs, DEFAULT_INTERVAL_SECS)
                .min(MAX_INTERVAL_SECS),
            precision: self.precision.clamp(MIN_PRECISION, MAX_PRECISION),
            encrypted: self.encrypted,
            recipient_pubkeys: self
                .recipient_pubkeys
                .iter()
                .map(|r| r.trim())
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .collect(),
            d_tag: if d_tag.is_empty() {
                DEFAULT_D_TAG.to_string()
            } else {
                d_tag.to_string()
            },
            expiration_secs: non_zero(self.expiration_secs, DEFAULT_EXPIRATION_SECS),
        }
    }

    /// Checks every field without modifying anything.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range field or unparsable recipient.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_secs == 0 || self.interval_secs > MAX_INTERVAL_SECS {
            return Err(ConfigError::OutOfRange {
                field: "intervalSecs",
                value: self.interval_secs.to_string(),
            });
        }
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&self.precision) {
            return Err(ConfigError::OutOfRange {
                field: "precision",
                value: self.precision.to_string(),
            });
        }
        if self.expiration_secs == 0 {
            return Err(ConfigError::OutOfRange {
                field: "expirationSecs",
                value: self.expiration_secs.to_string(),
            });
        }
        if let Some(bad) = self
            .recipient_pubkeys
            .iter()
            .find(|r| PublicKey::parse(r.trim()).is_err())
        {
            return Err(ConfigError::InvalidRecipient(bad.clone()));
        }
        Ok(())
    }
}
