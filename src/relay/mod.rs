//! Relay set and fan-out publishing.
//!
//! ```text
//! RelayStore (persisted ws:// / wss:// list)
//!        ↓ snapshot per tick
//! RelayPublisher ── join_all ──┬── RelayTransport::send(relay 1)
//!                              ├── RelayTransport::send(relay 2)
//!                              └── ...
//!        ↓
//! PublishResult (accepted_by, failed)
//! ```
//!
//! The wire protocol is delegated to `nostr-sdk` through
//! [`NostrRelayTransport`]. Hosts and tests may substitute their own
//! [`RelayTransport`].

mod error;
mod publisher;
mod store;
mod transport;
mod types;

pub use error::{RelayError, RelayResult};
pub use publisher::RelayPublisher;
pub use store::{is_valid_relay_url, RelayStore, DEFAULT_RELAY, RELAYS_STORAGE_KEY};
pub use transport::{NostrRelayTransport, RelayTransport, DEFAULT_SEND_TIMEOUT};
pub use types::{PublishResult, RetryPolicy};
