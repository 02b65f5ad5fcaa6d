//! Error types for the tracking lifecycle.

use thiserror::Error;

use crate::location::LocationError;
use crate::nostr::NostrError;

/// Errors surfaced by the tracking controller.
///
/// Per-relay failures never abort a cycle; they are reported in the
/// cycle's [`PublishResult`](crate::relay::PublishResult)s instead.
///
/// Only [`TrackingController::start`](super::TrackingController::start) and
/// [`TrackingController::tick_now`](super::TrackingController::tick_now)
/// return these. Timer-driven ticks log them instead.
#[derive(Debug, Error)]
pub enum TrackingError {
    /// The position source failed or a coordinate was invalid.
    #[error(transparent)]
    Location(#[from] LocationError),

    /// Building, encrypting or signing a record failed.
    #[error(transparent)]
    Nostr(#[from] NostrError),
}

impl TrackingError {
    /// Returns true if the cycle was aborted for lack of a signer.
    #[must_use]
    pub const fn is_missing_signer(&self) -> bool {
        matches!(self, Self::Nostr(NostrError::MissingSigner))
    }

    /// Returns true if encrypted mode was requested without a local secret.
    #[must_use]
    pub const fn is_missing_encryption_secret(&self) -> bool {
        matches!(self, Self::Nostr(NostrError::MissingEncryptionSecret))
    }
}

/// Result type for tracking operations.
pub type TrackingResult<T> = Result<T, TrackingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nostr_errors_are_transparent() {
        let err: TrackingError = NostrError::MissingSigner.into();
        assert!(err.is_missing_signer());
        assert_eq!(err.to_string(), NostrError::MissingSigner.to_string());
    }

    #[test]
    fn encryption_secret_classification() {
        let err: TrackingError = NostrError::MissingEncryptionSecret.into();
        assert!(err.is_missing_encryption_secret());
        assert!(!err.is_missing_signer());
    }

    #[test]
    fn location_error_converts() {
        let err: TrackingError = LocationError::Source("permission denied".to_string()).into();
        assert!(matches!(err, TrackingError::Location(_)));
    }
}
