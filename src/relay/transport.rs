//! Relay transport seam and its `nostr-sdk` implementation.

use std::time::Duration;

use async_trait::async_trait;
use nostr::{Event, RelayUrl};
use nostr_sdk::Client;

use super::error::{RelayError, RelayResult};

/// Default timeout for a single relay send.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Delivers a signed event to one relay.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    /// Sends `event` to `relay_url` and waits for the relay's answer.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the connection fails, the
    /// relay rejects the event, or no answer arrives in time.
    async fn send(&self, relay_url: &str, event: &Event) -> RelayResult<()>;
}

/// [`RelayTransport`] backed by a shared [`nostr_sdk::Client`].
///
/// Relays are added to the client pool on first use and stay connected
/// between publishes.
pub struct NostrRelayTransport {
    client: Client,
    timeout: Duration,
}

impl Default for NostrRelayTransport {
    fn default() -> Self {
        Self::new(DEFAULT_SEND_TIMEOUT)
    }
}

impl NostrRelayTransport {
    /// Creates a transport with its own client and the given send timeout.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::builder().build(),
            timeout,
        }
    }
}

#[async_trait]
impl RelayTransport for NostrRelayTransport {
    async fn send(&self, relay_url: &str, event: &Event) -> RelayResult<()> {
        let url = RelayUrl::parse(relay_url)
            .map_err(|e| RelayError::InvalidUrl(format!("{relay_url}: {e}")))?;

        // Returns Ok(false) when the relay is already in the pool.
        self.client
            .add_relay(url.clone())
            .await
            .map_err(|e| RelayError::Connection {
                url: relay_url.to_string(),
                reason: e.to_string(),
            })?;
        self.client.connect().await;

        let output = tokio::time::timeout(self.timeout, self.client.send_event_to([url.clone()], event))
            .await
            .map_err(|_| RelayError::Timeout(relay_url.to_string()))?
            .map_err(|e| RelayError::Publish(e.to_string()))?;

        if output.success.contains(&url) {
            return Ok(());
        }
        match output.failed.get(&url) {
            Some(reason) => Err(RelayError::Rejected {
                relay: relay_url.to_string(),
                reason: reason.clone(),
            }),
            None => Err(RelayError::Publish(format!("{relay_url}: no response"))),
        }
    }
}

impl std::fmt::Debug for NostrRelayTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NostrRelayTransport")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nostr::{EventBuilder, Keys};

    #[tokio::test]
    async fn invalid_url_is_rejected_before_connecting() {
        let transport = NostrRelayTransport::default();
        let event = EventBuilder::text_note("hi").sign_with_keys(&Keys::generate()).unwrap();

        let result = transport.send("not a url", &event).await;

        assert!(matches!(result, Err(RelayError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn debug_shows_timeout() {
        let transport = NostrRelayTransport::new(Duration::from_secs(5));
        assert!(format!("{transport:?}").contains("5s"));
    }
}
