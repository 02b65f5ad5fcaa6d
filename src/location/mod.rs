//! Location module for Sentinel.
//!
//! Provides the inputs of the publish pipeline:
//! - [`Position`] readings with validated coordinates
//! - Geohash encoding at a configurable precision (1-12 characters)
//! - The [`PositionSource`] seam to the platform location API
//!
//! # Example Usage
//!
//! ```
//! use sentinel_core::location::{geohash, Position};
//!
//! let position = Position::new(60.17, 24.94).unwrap().with_accuracy(5.0);
//! let token = geohash::encode(position.latitude, position.longitude, 8).unwrap();
//! assert_eq!(token.len(), 8);
//! ```

mod error;
pub mod geohash;
mod source;
mod types;

pub use error::{LocationError, Result};
pub use source::{BroadcastPositionSource, PositionCallback, PositionSource, WatchHandle};
pub use types::Position;
