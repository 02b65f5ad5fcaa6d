//! NIP-44 encryption for location payloads.
//!
//! The conversation key is derived by ECDH from the local secret key and the
//! recipient's public key, so encrypting always needs the raw local secret.
//! A delegated signer alone is never enough for encrypted mode.

use nostr::nips::nip44;
use nostr::{PublicKey, SecretKey};

use crate::nostr::error::{NostrError, Result};

/// Authenticated encryption of payloads between two keys.
pub trait PayloadCipher: Send + Sync {
    /// Encrypts `plaintext` from `secret` to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns an error if key agreement or encryption fails.
    fn encrypt(&self, secret: &SecretKey, recipient: &PublicKey, plaintext: &str)
        -> Result<String>;

    /// Decrypts `ciphertext` sent by `sender` to the holder of `secret`.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is malformed or fails authentication.
    fn decrypt(&self, secret: &SecretKey, sender: &PublicKey, ciphertext: &str)
        -> Result<String>;
}

/// NIP-44 v2 cipher (ChaCha20 + HMAC-SHA256, base64 payload).
#[derive(Debug, Clone, Copy, Default)]
pub struct Nip44Cipher;

impl PayloadCipher for Nip44Cipher {
    fn encrypt(
        &self,
        secret: &SecretKey,
        recipient: &PublicKey,
        plaintext: &str,
    ) -> Result<String> {
        nip44::encrypt(secret, recipient, plaintext, nip44::Version::V2)
            .map_err(|e| NostrError::Encryption(e.to_string()))
    }

    fn decrypt(&self, secret: &SecretKey, sender: &PublicKey, ciphertext: &str) -> Result<String> {
        nip44::decrypt(secret, sender, ciphertext).map_err(|e| NostrError::Decryption(e.to_string()))
    }
}
