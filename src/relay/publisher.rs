//! Fan-out publishing over a [`RelayTransport`].

use std::sync::Arc;

use futures::future::join_all;
use nostr::Event;

use super::error::RelayResult;
use super::transport::RelayTransport;
use super::types::{PublishResult, RetryPolicy};

/// Publishes each event to every configured relay independently.
///
/// A failing relay never affects the others. Failures are logged and
/// collected in the returned [`PublishResult`]; nothing is raised.
#[derive(Clone)]
pub struct RelayPublisher {
    transport: Arc<dyn RelayTransport>,
    retry: RetryPolicy,
}

impl RelayPublisher {
    /// Creates a publisher with no retry.
    #[must_use]
    pub fn new(transport: Arc<dyn RelayTransport>) -> Self {
        Self {
            transport,
            retry: RetryPolicy::none(),
        }
    }

    /// Sets the per-relay retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the active retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Sends `event` to all `relays` concurrently.
    pub async fn publish(&self, event: &Event, relays: &[String]) -> PublishResult {
        let sends = relays.iter().map(|relay| async move {
            let outcome = self.send_with_retry(relay, event).await;
            (relay, outcome)
        });

        let mut result = PublishResult::new(event.id);
        for (relay, outcome) in join_all(sends).await {
            match outcome {
                Ok(()) => result.accepted_by.push(relay.clone()),
                Err(e) => {
                    log::warn!("Publish of {} to {relay} failed: {e}", event.id);
                    result.failed.push((relay.clone(), e));
                }
            }
        }

        if result.is_success() {
            log::info!(
                "Published {} to {}/{} relays",
                event.id,
                result.success_count(),
                result.total_attempted()
            );
        }
        result
    }

    async fn send_with_retry(&self, relay: &str, event: &Event) -> RelayResult<()> {
        let mut attempt = 1;
        loop {
            match self.transport.send(relay, event).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_transient() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.backoff(attempt);
                    log::debug!("Retrying {relay} in {delay:?} after attempt {attempt}: {e}");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl std::fmt::Debug for RelayPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayPublisher")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::RelayError;
    use async_trait::async_trait;
    use nostr::{EventBuilder, Keys};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Fails the first `failures[relay]` sends to each relay.
    #[derive(Default)]
    struct FlakyTransport {
        failures: Mutex<HashMap<String, u32>>,
        attempts: Mutex<HashMap<String, u32>>,
    }

    impl FlakyTransport {
        fn failing(relay: &str, times: u32) -> Self {
            let transport = Self::default();
            transport
                .failures
                .lock()
                .unwrap()
                .insert(relay.to_string(), times);
            transport
        }

        fn attempts(&self, relay: &str) -> u32 {
            self.attempts.lock().unwrap().get(relay).copied().unwrap_or(0)
        }
    }

    #[async_trait]
    impl RelayTransport for FlakyTransport {
        async fn send(&self, relay_url: &str, _event: &Event) -> RelayResult<()> {
            *self
                .attempts
                .lock()
                .unwrap()
                .entry(relay_url.to_string())
                .or_default() += 1;

            let mut failures = self.failures.lock().unwrap();
            match failures.get_mut(relay_url) {
                Some(left) if *left > 0 => {
                    *left -= 1;
                    Err(RelayError::Connection {
                        url: relay_url.to_string(),
                        reason: "refused".to_string(),
                    })
                }
                _ => Ok(()),
            }
        }
    }

    fn event() -> Event {
        EventBuilder::text_note("test")
            .sign_with_keys(&Keys::generate())
            .unwrap()
    }

    fn relays() -> Vec<String> {
        vec![
            "wss://a.example.com".to_string(),
            "wss://b.example.com".to_string(),
        ]
    }

    #[tokio::test]
    async fn all_relays_accept() {
        let publisher = RelayPublisher::new(Arc::new(FlakyTransport::default()));
        let event = event();
        let result = publisher.publish(&event, &relays()).await;

        assert_eq!(result.event_id, event.id);
        assert_eq!(result.accepted_by, relays());
        assert!(result.failed.is_empty());
    }

    #[tokio::test]
    async fn one_failing_relay_does_not_affect_others() {
        let transport = Arc::new(FlakyTransport::failing("wss://a.example.com", u32::MAX));
        let publisher = RelayPublisher::new(transport.clone());
        let result = publisher.publish(&event(), &relays()).await;

        assert_eq!(result.accepted_by, vec!["wss://b.example.com"]);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].0, "wss://a.example.com");
        assert!(result.is_partial());
        assert_eq!(transport.attempts("wss://a.example.com"), 1);
    }

    #[tokio::test]
    async fn empty_relay_set_publishes_nowhere() {
        let publisher = RelayPublisher::new(Arc::new(FlakyTransport::default()));
        let result = publisher.publish(&event(), &[]).await;
        assert_eq!(result.total_attempted(), 0);
        assert!(!result.is_success());
    }

    #[tokio::test(start_paused = true)]
    async fn retry_recovers_transient_failure() {
        let transport = Arc::new(FlakyTransport::failing("wss://a.example.com", 2));
        let publisher = RelayPublisher::new(transport.clone()).with_retry(RetryPolicy::exponential(
            3,
            Duration::from_millis(100),
            Duration::from_secs(1),
        ));

        let result = publisher.publish(&event(), &relays()).await;

        assert_eq!(result.success_count(), 2);
        assert_eq!(transport.attempts("wss://a.example.com"), 3);
        assert_eq!(transport.attempts("wss://b.example.com"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_gives_up_after_max_attempts() {
        let transport = Arc::new(FlakyTransport::failing("wss://a.example.com", 10));
        let publisher = RelayPublisher::new(transport.clone()).with_retry(RetryPolicy::exponential(
            2,
            Duration::from_millis(100),
            Duration::from_secs(1),
        ));

        let result = publisher.publish(&event(), &relays()).await;

        assert_eq!(result.failed.len(), 1);
        assert_eq!(transport.attempts("wss://a.example.com"), 2);
    }
}
