//! Error types for Nostr record construction, signing and parsing.

use thiserror::Error;

use crate::location::LocationError;

/// Errors that can occur while building, signing or parsing location events.
#[derive(Error, Debug)]
pub enum NostrError {
    /// Neither a local secret key nor a delegated signer is available.
    #[error("No signer available: need a local secret key or a delegated signer")]
    MissingSigner,

    /// Encrypted mode needs the raw local secret for NIP-44 key agreement.
    #[error("Encrypted location requires a local secret key")]
    MissingEncryptionSecret,

    /// A recipient identifier is not a valid public key.
    #[error("Invalid recipient public key: {0}")]
    InvalidRecipient(String),

    /// Secret key material could not be parsed.
    #[error("Invalid secret key: {0}")]
    InvalidSecretKey(String),

    /// Coordinate could not be geohash-encoded or decoded.
    #[error("Geohash error: {0}")]
    Geohash(#[from] LocationError),

    /// Encryption operation failed.
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// Decryption operation failed.
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// Event signing failed.
    #[error("Event signing failed: {0}")]
    Signing(String),

    /// Serialization failed.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid event structure or content.
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// Event signature verification failed.
    #[error("Invalid event signature")]
    InvalidSignature,
}

/// Result type for Nostr operations.
pub type Result<T> = std::result::Result<T, NostrError>;
