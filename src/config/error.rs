//! Error types for tracking configuration.

use thiserror::Error;

/// Errors reported by explicit configuration validation.
///
/// The [`ConfigStore`](super::ConfigStore) never raises these; it normalizes
/// out-of-range values to defaults instead. Hosts that want to reject a form
/// before saving call [`TrackingConfig::validate`](super::TrackingConfig::validate).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A numeric field is outside its accepted range.
    #[error("Config field {field} out of range: {value}")]
    OutOfRange {
        /// The offending field name.
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A recipient public key could not be parsed.
    #[error("Invalid recipient public key: {0}")]
    InvalidRecipient(String),
}
