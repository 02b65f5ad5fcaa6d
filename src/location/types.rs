//! Location data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::Result;
use super::geohash::validate_coordinate;

/// A single position reading delivered by a position source.
///
/// Only the most recent reading is retained by the tracking controller.
///
/// # Example
///
/// ```
/// use sentinel_core::location::Position;
///
/// let position = Position::new(60.17, 24.94).unwrap().with_accuracy(5.0);
/// assert_eq!(position.accuracy, Some(5.0));
/// assert!(Position::new(91.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in degrees, within [-90, 90].
    pub latitude: f64,

    /// Longitude in degrees, within [-180, 180].
    pub longitude: f64,

    /// Horizontal accuracy radius in metres, if reported.
    pub accuracy: Option<f64>,

    /// When the reading was captured (UTC).
    pub timestamp: DateTime<Utc>,
}

impl Position {
    /// Creates a position captured now.
    ///
    /// # Errors
    ///
    /// Returns an error if either coordinate is non-finite or out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        validate_coordinate(latitude, longitude)?;
        Ok(Self {
            latitude,
            longitude,
            accuracy: None,
            timestamp: Utc::now(),
        })
    }

    /// Sets the accuracy radius.
    ///
    /// Negative or non-finite values mean "not reported" and are dropped.
    #[must_use]
    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = (accuracy.is_finite() && accuracy >= 0.0).then_some(accuracy);
        self
    }

    /// Overrides the capture time.
    #[must_use]
    pub const fn captured_at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::LocationError;

    #[test]
    fn new_accepts_valid_boundaries() {
        assert!(Position::new(90.0, 180.0).is_ok());
        assert!(Position::new(-90.0, -180.0).is_ok());
        assert!(Position::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn new_rejects_out_of_range() {
        assert_eq!(
            Position::new(91.0, 0.0),
            Err(LocationError::LatitudeOutOfRange(91.0))
        );
        assert_eq!(
            Position::new(0.0, -181.0),
            Err(LocationError::LongitudeOutOfRange(-181.0))
        );
    }

    #[test]
    fn new_rejects_nan() {
        assert!(Position::new(f64::NAN, 0.0).is_err());
        assert!(Position::new(0.0, f64::NAN).is_err());
    }

    #[test]
    fn accuracy_defaults_to_none() {
        let position = Position::new(60.17, 24.94).unwrap();
        assert_eq!(position.accuracy, None);
    }

    #[test]
    fn negative_accuracy_is_dropped() {
        let position = Position::new(60.17, 24.94).unwrap().with_accuracy(-1.0);
        assert_eq!(position.accuracy, None);
    }

    #[test]
    fn nan_accuracy_is_dropped() {
        let position = Position::new(60.17, 24.94).unwrap().with_accuracy(f64::NAN);
        assert_eq!(position.accuracy, None);
    }

    #[test]
    fn captured_at_overrides_timestamp() {
        let when = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let position = Position::new(60.17, 24.94).unwrap().captured_at(when);
        assert_eq!(position.timestamp, when);
    }
}
