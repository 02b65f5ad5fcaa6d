//! Signing dispatch.
//!
//! A location record can be signed two ways:
//!
//! - **Local**: a raw secret key held in memory signs the template directly.
//! - **Delegated**: an external signer (browser extension, remote bunker,
//!   hardware key) receives the template and returns a signed event.
//!
//! [`Credentials`] holds whichever of the two the host supplied and resolves
//! a [`SigningStrategy`] once per publish cycle. Delegated signing is
//! preferred when both are present; the local secret is still needed for
//! NIP-44 encryption.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use nostr::{Event, Keys, PublicKey};

use super::error::{NostrError, Result};
use super::event::LocationTemplate;

/// An external signer that turns templates into signed events.
///
/// Implementations typically forward the template JSON
/// ([`LocationTemplate::to_json`]) to a NIP-07 or NIP-46 signer.
#[async_trait]
pub trait DelegatedSigner: Send + Sync {
    /// Returns the public key events will be signed with.
    ///
    /// # Errors
    ///
    /// Returns an error if the signer is unreachable.
    async fn public_key(&self) -> Result<PublicKey>;

    /// Signs `template`.
    ///
    /// # Errors
    ///
    /// Returns an error if the signer refuses or fails.
    async fn sign_template(&self, template: &LocationTemplate) -> Result<Event>;
}

/// Signing material supplied when tracking starts.
#[derive(Clone, Default)]
pub struct Credentials {
    secret: Option<Keys>,
    delegated: Option<Arc<dyn DelegatedSigner>>,
}

impl Credentials {
    /// Creates empty credentials.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Adds a local secret key.
    #[must_use]
    pub fn with_secret_key(mut self, keys: Keys) -> Self {
        self.secret = Some(keys);
        self
    }

    /// Parses a local secret key from hex or `nsec` bech32.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::InvalidSecretKey`] if the key cannot be parsed.
    pub fn parse_secret(mut self, secret: &str) -> Result<Self> {
        let keys = Keys::parse(secret.trim()).map_err(|e| NostrError::InvalidSecretKey(e.to_string()))?;
        self.secret = Some(keys);
        Ok(self)
    }

    /// Adds a delegated signer.
    #[must_use]
    pub fn with_delegated_signer(mut self, signer: Arc<dyn DelegatedSigner>) -> Self {
        self.delegated = Some(signer);
        self
    }

    /// Returns the local keys, if any.
    #[must_use]
    pub const fn secret_keys(&self) -> Option<&Keys> {
        self.secret.as_ref()
    }

    /// Returns true if a delegated signer is present.
    #[must_use]
    pub const fn has_delegated_signer(&self) -> bool {
        self.delegated.is_some()
    }

    /// Returns true if neither a secret nor a signer is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.secret.is_none() && self.delegated.is_none()
    }

    /// Resolves how records will be signed.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::MissingSigner`] if neither credential is present.
    pub fn signing_strategy(&self) -> Result<SigningStrategy> {
        if let Some(signer) = &self.delegated {
            return Ok(SigningStrategy::Delegated(Arc::clone(signer)));
        }
        self.secret
            .clone()
            .map(SigningStrategy::Local)
            .ok_or(NostrError::MissingSigner)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("delegated", &self.delegated.is_some())
            .finish()
    }
}

/// How a single publish cycle signs its records.
#[derive(Clone)]
pub enum SigningStrategy {
    /// Sign with an in-memory secret key.
    Local(Keys),
    /// Hand templates to an external signer.
    Delegated(Arc<dyn DelegatedSigner>),
}

impl SigningStrategy {
    /// Signs `template`.
    ///
    /// Events returned by a delegated signer are verified and checked
    /// against the template before they are accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails or the delegated signer returns an
    /// event that does not match the template.
    pub async fn sign(&self, template: &LocationTemplate) -> Result<Event> {
        match self {
            Self::Local(keys) => template
                .to_unsigned(keys.public_key())?
                .sign_with_keys(keys)
                .map_err(|e| NostrError::Signing(e.to_string())),
            Self::Delegated(signer) => {
                let event = signer.sign_template(template).await?;
                check_delegated_event(&event, template)?;
                Ok(event)
            }
        }
    }

    /// Returns true for [`SigningStrategy::Delegated`].
    #[must_use]
    pub const fn is_delegated(&self) -> bool {
        matches!(self, Self::Delegated(_))
    }
}

impl fmt::Debug for SigningStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(keys) => f.debug_tuple("Local").field(&keys.public_key()).finish(),
            Self::Delegated(_) => f.write_str("Delegated"),
        }
    }
}

fn check_delegated_event(event: &Event, template: &LocationTemplate) -> Result<()> {
    event.verify().map_err(|_| NostrError::InvalidSignature)?;

    if event.kind.as_u16() != template.kind.as_u16() {
        return Err(NostrError::InvalidEvent(format!(
            "signer returned kind {}, expected {}",
            event.kind.as_u16(),
            template.kind.as_u16()
        )));
    }
    if event.created_at.as_u64() != template.created_at {
        return Err(NostrError::InvalidEvent(format!(
            "signer re-stamped event at {}, expected {}",
            event.created_at.as_u64(),
            template.created_at
        )));
    }
    if event.content != template.content {
        return Err(NostrError::InvalidEvent(
            "signer altered event content".to_string(),
        ));
    }
    let tags: Vec<Vec<String>> = event.tags.iter().map(|t| t.as_slice().to_vec()).collect();
    if tags != template.tags {
        return Err(NostrError::InvalidEvent(
            "signer altered event tags".to_string(),
        ));
    }
    Ok(())
}
