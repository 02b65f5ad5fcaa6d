//! Sentinel Core Library
//!
//! Core functionality for Sentinel - periodic location publishing over Nostr.
//! A device samples its position, encodes it as a geohash and publishes it
//! to a set of relays, either in the clear (kind 30472) or NIP-44 encrypted
//! for chosen recipients (kind 30473).
//!
//! The crate has no UI and holds no keys of its own. Hosts plug in a
//! [`location::PositionSource`], a [`storage::KeyValueStore`], signing
//! [`nostr::Credentials`] and optionally a [`relay::RelayTransport`], then
//! drive everything through [`Sentinel`].

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![deny(unsafe_code)]

mod api;
pub mod config;
pub mod location;
pub mod nostr;
mod observable;
pub mod relay;
pub mod storage;
pub mod tracking;

pub use api::{Sentinel, SentinelBuilder};
pub use observable::{Observable, SubscriptionToken};
