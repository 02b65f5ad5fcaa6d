//! Nostr location records.
//!
//! This module turns positions into signed Nostr events and back:
//!
//! ```text
//! Position + TrackingConfig
//!          ↓
//!   ReportBuilder (geohash, tags, NIP-44 for encrypted mode)
//!          ↓
//!   LocationTemplate (kind 30472 / 30473, unsigned)
//!          ↓
//!   SigningStrategy (local key or delegated signer)
//!          ↓
//!   Event (ready for relay)
//! ```
//!
//! # Security
//!
//! - Encrypted records carry the geohash only inside NIP-44 v2 ciphertext
//! - Encrypted mode never falls back to plaintext without a local secret
//! - Events from a delegated signer are verified before publishing
//! - NIP-40 expiration enables automatic relay cleanup
//!
//! # Example
//!
//! ```
//! use nostr::{Keys, Timestamp};
//! use sentinel_core::config::TrackingConfig;
//! use sentinel_core::location::Position;
//! use sentinel_core::nostr::{parse_public_event, ReportBuilder, SigningStrategy};
//!
//! # futures::executor::block_on(async {
//! let keys = Keys::generate();
//! let position = Position::new(37.7749, -122.4194).unwrap();
//! let templates = ReportBuilder::default()
//!     .build(&position, &TrackingConfig::default(), Timestamp::now(), None)
//!     .unwrap();
//!
//! let event = SigningStrategy::Local(keys).sign(&templates[0]).await.unwrap();
//! let parsed = parse_public_event(&event).unwrap();
//! assert_eq!(parsed.geohash, "9q8yyk8y");
//! # });
//! ```

mod error;
mod event;
mod parser;
mod report;
mod signer;
mod tags;

pub mod encryption;

pub use encryption::{Nip44Cipher, PayloadCipher};
pub use error::{NostrError, Result};
pub use event::{LocationKind, LocationTemplate, KIND_ENCRYPTED_LOCATION, KIND_PUBLIC_LOCATION};
pub use parser::{parse_encrypted_content, parse_encrypted_event, parse_public_event, ParsedLocation};
pub use report::{encrypted_payload, ReportBuilder};
pub use signer::{Credentials, DelegatedSigner, SigningStrategy};
pub use tags::TagBuilder;
