//! Location record templates.
//!
//! A [`LocationTemplate`] is the unsigned form of a location report. It is
//! turned into a signed [`nostr::Event`] by a
//! [`SigningStrategy`](super::SigningStrategy):
//!
//! ```text
//! Kind 30472 (public)                  Kind 30473 (encrypted)
//! tags: [g, d, expiration, accuracy?]  tags: [p, d, expiration]
//! content: ""                          content: NIP-44([[g], [accuracy]?])
//! ```

use nostr::prelude::{EventBuilder, Kind, PublicKey, Tag, Timestamp, UnsignedEvent};
use serde::{Deserialize, Serialize};

use super::error::{NostrError, Result};
use super::tags::find_tag_value;

/// Event kind for public location records.
pub const KIND_PUBLIC_LOCATION: u16 = 30472;

/// Event kind for NIP-44 encrypted location records.
pub const KIND_ENCRYPTED_LOCATION: u16 = 30473;

/// The two location record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum LocationKind {
    /// Kind 30472: geohash in the clear.
    Public,
    /// Kind 30473: geohash encrypted for one recipient.
    Encrypted,
}

impl LocationKind {
    /// Returns the numeric event kind.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        match self {
            Self::Public => KIND_PUBLIC_LOCATION,
            Self::Encrypted => KIND_ENCRYPTED_LOCATION,
        }
    }

    /// Maps a numeric kind back to a location kind.
    #[must_use]
    pub const fn from_u16(kind: u16) -> Option<Self> {
        match kind {
            KIND_PUBLIC_LOCATION => Some(Self::Public),
            KIND_ENCRYPTED_LOCATION => Some(Self::Encrypted),
            _ => None,
        }
    }
}

impl From<LocationKind> for u16 {
    fn from(kind: LocationKind) -> Self {
        kind.as_u16()
    }
}

impl TryFrom<u16> for LocationKind {
    type Error = String;

    fn try_from(kind: u16) -> std::result::Result<Self, Self::Error> {
        Self::from_u16(kind).ok_or_else(|| format!("not a location kind: {kind}"))
    }
}

impl From<LocationKind> for Kind {
    fn from(kind: LocationKind) -> Self {
        Self::Custom(kind.as_u16())
    }
}

/// An unsigned location record.
///
/// Serializes to the NIP-07 style template shape
/// `{kind, created_at, tags, content}` so it can be handed to an external
/// signer unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationTemplate {
    /// Record kind.
    pub kind: LocationKind,

    /// Ordered `[name, value]` tags.
    pub tags: Vec<Vec<String>>,

    /// Empty for public records, NIP-44 ciphertext for encrypted ones.
    pub content: String,

    /// Unix timestamp when the record was created.
    pub created_at: u64,

    /// Unix timestamp carried in the `expiration` tag.
    #[serde(skip)]
    pub expires_at: u64,
}

impl LocationTemplate {
    /// Returns the value of the first tag named `name`.
    #[must_use]
    pub fn tag_value(&self, name: &str) -> Option<&str> {
        find_tag_value(&self.tags, name)
    }

    /// Builds the unsigned Nostr event for `author`.
    ///
    /// # Errors
    ///
    /// Returns an error if a tag cannot be parsed into a Nostr tag.
    pub fn to_unsigned(&self, author: PublicKey) -> Result<UnsignedEvent> {
        let tags = self
            .tags
            .iter()
            .map(|t| Tag::parse(t).map_err(|e| NostrError::InvalidEvent(e.to_string())))
            .collect::<Result<Vec<Tag>>>()?;

        Ok(EventBuilder::new(self.kind.into(), self.content.clone())
            .tags(tags)
            .custom_created_at(Timestamp::from(self.created_at))
            .build(author))
    }

    /// Serializes the template for an external signer.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(NostrError::from)
    }
}
