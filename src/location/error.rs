//! Error types for location handling.

use thiserror::Error;

/// Errors that can occur while validating or encoding positions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    /// Latitude is not finite or outside [-90, 90].
    #[error("Latitude out of range: {0}")]
    LatitudeOutOfRange(f64),

    /// Longitude is not finite or outside [-180, 180].
    #[error("Longitude out of range: {0}")]
    LongitudeOutOfRange(f64),

    /// Geohash precision outside [1, 12].
    #[error("Invalid geohash precision: {0}")]
    InvalidPrecision(u8),

    /// Geohash string could not be decoded.
    #[error("Invalid geohash: {0}")]
    InvalidGeohash(String),

    /// The position source could not be started or stopped.
    #[error("Position source error: {0}")]
    Source(String),
}

/// Result type alias for location operations.
pub type Result<T> = std::result::Result<T, LocationError>;
