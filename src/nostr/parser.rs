//! Reading location records back out of signed events.

use nostr::{Event, Keys, PublicKey, Timestamp};
use serde::{Deserialize, Serialize};

use super::encryption::{Nip44Cipher, PayloadCipher};
use super::error::{NostrError, Result};
use super::event::LocationKind;
use super::tags::find_tag_value;
use crate::location::geohash;

/// A location extracted from a kind 30472 or 30473 event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedLocation {
    /// Geohash token as published.
    pub geohash: String,
    /// Latitude of the geohash cell centre.
    pub latitude: f64,
    /// Longitude of the geohash cell centre.
    pub longitude: f64,
    /// Accuracy radius in metres, if published.
    pub accuracy: Option<f64>,
    /// Stream identifier from the `d` tag.
    pub d_tag: Option<String>,
    /// Event creation time.
    pub created_at: Timestamp,
    /// Record kind.
    pub kind: LocationKind,
    /// Event author.
    pub author: PublicKey,
}

fn event_tags(event: &Event) -> Vec<Vec<String>> {
    event.tags.iter().map(|t| t.as_slice().to_vec()).collect()
}

fn expect_kind(event: &Event, expected: LocationKind) -> Result<()> {
    match LocationKind::from_u16(event.kind.as_u16()) {
        Some(kind) if kind == expected => Ok(()),
        _ => Err(NostrError::InvalidEvent(format!(
            "expected kind {}, got {}",
            expected.as_u16(),
            event.kind.as_u16()
        ))),
    }
}

fn parse_accuracy(tags: &[Vec<String>]) -> Option<f64> {
    find_tag_value(tags, "accuracy")
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|a| a.is_finite() && *a >= 0.0)
}

fn build_location(
    location_tags: &[Vec<String>],
    event_tags: &[Vec<String>],
    event: &Event,
    kind: LocationKind,
) -> Result<ParsedLocation> {
    let hash = find_tag_value(location_tags, "g")
        .ok_or_else(|| NostrError::InvalidEvent("missing g tag".to_string()))?;
    let (latitude, longitude) = geohash::decode(hash)?;

    Ok(ParsedLocation {
        geohash: hash.to_string(),
        latitude,
        longitude,
        accuracy: parse_accuracy(location_tags),
        d_tag: find_tag_value(event_tags, "d").map(str::to_string),
        created_at: event.created_at,
        kind,
        author: event.pubkey,
    })
}

/// Parses a public (kind 30472) location event.
///
/// # Errors
///
/// Returns [`NostrError::InvalidEvent`] for the wrong kind or a missing
/// `g` tag, and [`NostrError::Geohash`] for an undecodable geohash.
pub fn parse_public_event(event: &Event) -> Result<ParsedLocation> {
    expect_kind(event, LocationKind::Public)?;
    let tags = event_tags(event);
    build_location(&tags, &tags, event, LocationKind::Public)
}

/// Parses the already-decrypted content of an encrypted (kind 30473) event.
///
/// # Errors
///
/// Returns [`NostrError::InvalidEvent`] for the wrong kind or a missing
/// `g` entry, and [`NostrError::Serialization`] if `plaintext` is not a
/// JSON array of tags.
pub fn parse_encrypted_content(event: &Event, plaintext: &str) -> Result<ParsedLocation> {
    expect_kind(event, LocationKind::Encrypted)?;
    let inner: Vec<Vec<String>> = serde_json::from_str(plaintext)?;
    build_location(&inner, &event_tags(event), event, LocationKind::Encrypted)
}

/// Decrypts and parses an encrypted (kind 30473) event addressed to `keys`.
///
/// # Errors
///
/// Returns [`NostrError::Decryption`] if the content was not encrypted for
/// `keys`, plus every error of [`parse_encrypted_content`].
pub fn parse_encrypted_event(event: &Event, keys: &Keys) -> Result<ParsedLocation> {
    expect_kind(event, LocationKind::Encrypted)?;
    let plaintext = Nip44Cipher.decrypt(keys.secret_key(), &event.pubkey, &event.content)?;
    parse_encrypted_content(event, &plaintext)
}
