//! Reusable test doubles for integration tests.
//!
//! Signing and encryption are real; only the relay network, the position
//! platform and the wall clock are replaced.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use nostr::{Event, Keys, PublicKey};
use sentinel_core::location::{BroadcastPositionSource, Position};
use sentinel_core::nostr::{DelegatedSigner, LocationTemplate, NostrError};
use sentinel_core::relay::{RelayError, RelayResult, RelayTransport};
use sentinel_core::storage::{KeyValueStore, MemoryStore};
use sentinel_core::tracking::FixedClock;
use sentinel_core::Sentinel;

/// Unix time every fixture clock starts at.
pub const START_TIME: u64 = 1_700_000_000;

/// Records every send and fails those aimed at selected relays.
#[derive(Default)]
pub struct MockTransport {
    failing: Mutex<HashSet<String>>,
    sent: Mutex<Vec<(String, Event)>>,
    attempts: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes every send to `relay` fail with a connection error.
    pub fn fail_relay(&self, relay: &str) {
        self.failing.lock().unwrap().insert(relay.to_string());
    }

    /// Successful sends, in completion order.
    pub fn sent(&self) -> Vec<(String, Event)> {
        self.sent.lock().unwrap().clone()
    }

    /// Events delivered to `relay`.
    pub fn sent_to(&self, relay: &str) -> Vec<Event> {
        self.sent()
            .into_iter()
            .filter(|(r, _)| r == relay)
            .map(|(_, e)| e)
            .collect()
    }

    /// Every send attempt, successful or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RelayTransport for MockTransport {
    async fn send(&self, relay_url: &str, event: &Event) -> RelayResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(relay_url) {
            return Err(RelayError::Connection {
                url: relay_url.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((relay_url.to_string(), event.clone()));
        Ok(())
    }
}

/// Delegated signer backed by local keys, with an optional delay.
pub struct SlowSigner {
    keys: Keys,
    delay: Duration,
    calls: AtomicUsize,
}

impl SlowSigner {
    pub fn new(keys: Keys, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            keys,
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DelegatedSigner for SlowSigner {
    async fn public_key(&self) -> Result<PublicKey, NostrError> {
        Ok(self.keys.public_key())
    }

    async fn sign_template(&self, template: &LocationTemplate) -> Result<Event, NostrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        template
            .to_unsigned(self.keys.public_key())?
            .sign_with_keys(&self.keys)
            .map_err(|e| NostrError::Signing(e.to_string()))
    }
}

/// A fully wired instance with test doubles.
pub struct Harness {
    pub sentinel: Sentinel,
    pub storage: Arc<MemoryStore>,
    pub source: Arc<BroadcastPositionSource>,
    pub transport: Arc<MockTransport>,
    pub clock: Arc<FixedClock>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_storage(Arc::new(MemoryStore::new()))
    }

    pub fn with_storage(storage: Arc<MemoryStore>) -> Self {
        let source = Arc::new(BroadcastPositionSource::new());
        let transport = MockTransport::new();
        let clock = Arc::new(FixedClock::new(START_TIME));

        let sentinel = Sentinel::builder()
            .storage(Arc::clone(&storage) as Arc<dyn KeyValueStore>)
            .position_source(source.clone())
            .transport(transport.clone())
            .clock(clock.clone())
            .build();

        Self {
            sentinel,
            storage,
            source,
            transport,
            clock,
        }
    }

    /// Pushes a reading into the position source.
    pub fn push(&self, latitude: f64, longitude: f64) -> Position {
        let position = Position::new(latitude, longitude).unwrap();
        self.source.push(Some(position));
        position
    }
}

/// Lets spawned tasks run until they block.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
