//! Location report construction.
//!
//! Turns the latest [`Position`] and the current [`TrackingConfig`] into
//! unsigned [`LocationTemplate`]s: one public record, or one encrypted
//! record per recipient.

use std::sync::Arc;

use nostr::{Keys, PublicKey, Timestamp};

use super::encryption::{Nip44Cipher, PayloadCipher};
use super::error::{NostrError, Result};
use super::event::{LocationKind, LocationTemplate};
use super::tags::TagBuilder;
use crate::config::TrackingConfig;
use crate::location::{geohash, Position};

/// Builds location templates from positions.
///
/// # Example
///
/// ```
/// use nostr::Timestamp;
/// use sentinel_core::config::TrackingConfig;
/// use sentinel_core::location::Position;
/// use sentinel_core::nostr::ReportBuilder;
///
/// let position = Position::new(60.17, 24.94).unwrap();
/// let templates = ReportBuilder::default()
///     .build(&position, &TrackingConfig::default(), Timestamp::from(1_700_000_000), None)
///     .unwrap();
///
/// assert_eq!(templates.len(), 1);
/// assert_eq!(templates[0].tag_value("expiration"), Some("1700003600"));
/// ```
#[derive(Clone)]
pub struct ReportBuilder {
    cipher: Arc<dyn PayloadCipher>,
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new(Arc::new(Nip44Cipher))
    }
}

impl ReportBuilder {
    /// Creates a builder encrypting with `cipher`.
    #[must_use]
    pub fn new(cipher: Arc<dyn PayloadCipher>) -> Self {
        Self { cipher }
    }

    /// Builds the templates for one publish cycle.
    ///
    /// `now` becomes `created_at`; the expiration is `now + expiration_secs`.
    /// Encrypted mode with no recipients yields an empty list.
    ///
    /// # Errors
    ///
    /// - [`NostrError::Geohash`] if the position cannot be encoded
    /// - [`NostrError::MissingEncryptionSecret`] in encrypted mode without
    ///   local keys
    pub fn build(
        &self,
        position: &Position,
        config: &TrackingConfig,
        now: Timestamp,
        secret: Option<&Keys>,
    ) -> Result<Vec<LocationTemplate>> {
        let geohash = geohash::encode(position.latitude, position.longitude, config.precision)?;
        let created_at = now.as_u64();
        let expires_at = created_at.saturating_add(config.expiration_secs);

        if !config.encrypted {
            let mut tags = vec![
                TagBuilder::geohash_tag(&geohash),
                TagBuilder::d_tag(&config.d_tag),
                TagBuilder::expiration_tag(expires_at),
            ];
            if let Some(accuracy) = position.accuracy {
                tags.push(TagBuilder::accuracy_tag(accuracy));
            }
            return Ok(vec![LocationTemplate {
                kind: LocationKind::Public,
                tags,
                content: String::new(),
                created_at,
                expires_at,
            }]);
        }

        if config.recipient_pubkeys.is_empty() {
            return Ok(Vec::new());
        }
        let keys = secret.ok_or(NostrError::MissingEncryptionSecret)?;
        let payload = encrypted_payload(&geohash, position.accuracy)?;

        let mut templates = Vec::with_capacity(config.recipient_pubkeys.len());
        for recipient in &config.recipient_pubkeys {
            match self.encrypted_template(keys, recipient, &payload, config, created_at, expires_at) {
                Ok(template) => templates.push(template),
                Err(e) => log::warn!("Skipping recipient {recipient}: {e}"),
            }
        }
        Ok(templates)
    }

    fn encrypted_template(
        &self,
        keys: &Keys,
        recipient: &str,
        payload: &str,
        config: &TrackingConfig,
        created_at: u64,
        expires_at: u64,
    ) -> Result<LocationTemplate> {
        let recipient = PublicKey::parse(recipient)
            .map_err(|e| NostrError::InvalidRecipient(format!("{recipient}: {e}")))?;
        let content = self.cipher.encrypt(keys.secret_key(), &recipient, payload)?;

        Ok(LocationTemplate {
            kind: LocationKind::Encrypted,
            tags: vec![
                TagBuilder::p_tag(&recipient),
                TagBuilder::d_tag(&config.d_tag),
                TagBuilder::expiration_tag(expires_at),
            ],
            content,
            created_at,
            expires_at,
        })
    }
}

/// Serializes the plaintext carried inside an encrypted record:
/// `[["g", geohash], ["accuracy", value]?]`.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn encrypted_payload(geohash: &str, accuracy: Option<f64>) -> Result<String> {
    let mut tags = vec![TagBuilder::geohash_tag(geohash)];
    if let Some(accuracy) = accuracy {
        tags.push(TagBuilder::accuracy_tag(accuracy));
    }
    Ok(serde_json::to_string(&tags)?)
}
