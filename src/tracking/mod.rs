//! Tracking lifecycle and the publish cycle.
//!
//! [`TrackingController`] owns the start/stop state machine, the latest
//! position reading and the publish timer. Each timer tick runs one cycle:
//!
//! 1. Snapshot the config, relay set and credentials
//! 2. Build templates from the latest position
//! 3. Sign each template
//! 4. Fan each signed record out to every relay
//!
//! Cycle failures are logged and never stop tracking.

mod clock;
mod controller;
mod error;
mod guard;
mod types;

pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "test-utils"))]
pub use clock::FixedClock;
pub use controller::TrackingController;
pub use error::{TrackingError, TrackingResult};
pub use types::{TickOutcome, TickReport, TrackingState};
