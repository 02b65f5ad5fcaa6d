//! Error types for relay operations.
//!
//! Relay errors never abort a publish cycle. Each one is recorded against
//! the relay that produced it in [`PublishResult`](super::PublishResult).

use thiserror::Error;

/// Errors that can occur while publishing to a single relay.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Connection to relay failed.
    #[error("Failed to connect to relay {url}: {reason}")]
    Connection {
        /// The relay URL that failed.
        url: String,
        /// The reason for the failure.
        reason: String,
    },

    /// Event publishing failed.
    #[error("Failed to publish event: {0}")]
    Publish(String),

    /// Invalid relay URL.
    #[error("Invalid relay URL: {0}")]
    InvalidUrl(String),

    /// Relay rejected the event.
    #[error("Relay {relay} rejected event: {reason}")]
    Rejected {
        /// The relay that rejected the event.
        relay: String,
        /// The rejection reason.
        reason: String,
    },

    /// Timeout waiting for operation.
    #[error("Operation timed out: {0}")]
    Timeout(String),
}

impl RelayError {
    /// Returns true if retrying the same send could plausibly succeed.
    ///
    /// Malformed URLs and explicit rejections are permanent.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::Publish(_) | Self::Timeout(_)
        )
    }
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_error_display() {
        let error = RelayError::Connection {
            url: "wss://relay.example.com".to_string(),
            reason: "connection refused".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to connect to relay wss://relay.example.com: connection refused"
        );
    }

    #[test]
    fn rejected_error_display() {
        let error = RelayError::Rejected {
            relay: "wss://relay.example.com".to_string(),
            reason: "blocked: rate-limited".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Relay wss://relay.example.com rejected event: blocked: rate-limited"
        );
    }

    #[test]
    fn timeout_error_display() {
        let error = RelayError::Timeout("wss://slow.example.com".to_string());
        assert_eq!(error.to_string(), "Operation timed out: wss://slow.example.com");
    }

    #[test]
    fn transient_classification() {
        assert!(RelayError::Publish("reset".to_string()).is_transient());
        assert!(RelayError::Timeout("x".to_string()).is_transient());
        assert!(!RelayError::InvalidUrl("http://x".to_string()).is_transient());
        assert!(!RelayError::Rejected {
            relay: "wss://r".to_string(),
            reason: "invalid: bad sig".to_string(),
        }
        .is_transient());
    }
}
