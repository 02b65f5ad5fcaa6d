//! The tracking state machine.
//!
//! ```text
//!            start(credentials)
//!   Stopped ───────────────────▶ Tracking
//!      ▲                            │
//!      └────────── stop() ──────────┘
//! ```
//!
//! While tracking, the controller keeps the latest reading from the
//! position source and, once per interval, runs a publish cycle:
//! build templates, sign each one, fan it out to every relay.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};
use std::time::Duration;

use nostr::Timestamp;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::clock::Clock;
use super::error::TrackingResult;
use super::guard::TickPermit;
use super::types::{TickOutcome, TickReport, TrackingState};
use crate::config::ConfigStore;
use crate::location::{Position, PositionCallback, PositionSource, WatchHandle};
use crate::nostr::{Credentials, DelegatedSigner, ReportBuilder};
use crate::observable::Observable;
use crate::relay::{RelayPublisher, RelayStore};

/// Fallback first-tick delay when the interval overflows the clock
/// (about 30 years, as in tokio's own far-future sleep).
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// State shared between the controller and the tasks of one tracking
/// session.
struct SessionState {
    active: AtomicBool,
    in_flight: Arc<AtomicBool>,
    credentials: RwLock<Credentials>,
}

impl SessionState {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn credentials(&self) -> Credentials {
        self.credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

struct Session {
    shared: Arc<SessionState>,
    watch: WatchHandle,
    timer: JoinHandle<()>,
}

struct Inner {
    config: Arc<ConfigStore>,
    relays: Arc<RelayStore>,
    source: Arc<dyn PositionSource>,
    builder: ReportBuilder,
    publisher: RelayPublisher,
    clock: Arc<dyn Clock>,

    state: Observable<TrackingState>,
    last_position: Arc<Observable<Option<Position>>>,
    last_publish_time: Observable<Option<Timestamp>>,

    session: Mutex<Option<Session>>,
    skipped_ticks: AtomicU64,
}

/// Drives periodic location publishing.
///
/// At most one publish cycle per session runs at a time. A timer tick that
/// fires while the previous cycle is still signing or publishing is skipped
/// and counted in [`skipped_ticks`](Self::skipped_ticks).
///
/// The publish interval is read when tracking starts. Every other setting,
/// and the relay set, is read fresh at the start of each cycle.
pub struct TrackingController {
    inner: Arc<Inner>,
}

impl TrackingController {
    /// Creates a stopped controller.
    #[must_use]
    pub fn new(
        config: Arc<ConfigStore>,
        relays: Arc<RelayStore>,
        source: Arc<dyn PositionSource>,
        publisher: RelayPublisher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_builder(config, relays, source, ReportBuilder::default(), publisher, clock)
    }

    /// Creates a stopped controller with a custom report builder.
    #[must_use]
    pub fn with_builder(
        config: Arc<ConfigStore>,
        relays: Arc<RelayStore>,
        source: Arc<dyn PositionSource>,
        builder: ReportBuilder,
        publisher: RelayPublisher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                relays,
                source,
                builder,
                publisher,
                clock,
                state: Observable::new(TrackingState::Stopped),
                last_position: Arc::new(Observable::new(None)),
                last_publish_time: Observable::new(None),
                session: Mutex::new(None),
                skipped_ticks: AtomicU64::new(0),
            }),
        }
    }

    /// Starts tracking with the given signing material.
    ///
    /// Does nothing if already tracking. The first cycle runs one interval
    /// after this call.
    ///
    /// # Errors
    ///
    /// Returns an error if the position source refuses to start. The
    /// controller stays stopped in that case.
    pub async fn start(&self, credentials: Credentials) -> TrackingResult<()> {
        let mut session = self.inner.session.lock().await;
        if session.is_some() {
            log::debug!("start() ignored: already tracking");
            return Ok(());
        }

        let last_position = Arc::clone(&self.inner.last_position);
        let on_update: PositionCallback = Arc::new(move |reading| {
            if let Some(position) = reading {
                log::debug!(
                    "Position update ({:.5}, {:.5})",
                    position.latitude,
                    position.longitude
                );
                last_position.set(Some(position));
            }
        });
        let watch = self.inner.source.start_watching(on_update).await?;

        let shared = Arc::new(SessionState {
            active: AtomicBool::new(true),
            in_flight: Arc::new(AtomicBool::new(false)),
            credentials: RwLock::new(credentials),
        });
        let interval_secs = self.inner.config.get().interval_secs.max(1);
        let period = Duration::from_secs(interval_secs);
        let now = Instant::now();
        let first_tick = now
            .checked_add(period)
            .unwrap_or_else(|| now + FAR_FUTURE);
        let timer = tokio::spawn(run_timer(
            Arc::downgrade(&self.inner),
            Arc::clone(&shared),
            first_tick,
            period,
        ));

        *session = Some(Session {
            shared,
            watch,
            timer,
        });
        self.inner.state.set(TrackingState::Tracking);
        log::info!("Tracking started (interval {interval_secs}s)");
        Ok(())
    }

    /// Stops tracking.
    ///
    /// Does nothing if already stopped. A cycle in flight finishes the
    /// record it is on and sends nothing further; it does not hold up the
    /// cycles of a later session. The last position and publish time are
    /// kept.
    pub async fn stop(&self) {
        let mut session = self.inner.session.lock().await;
        let Some(current) = session.take() else {
            log::debug!("stop() ignored: not tracking");
            return;
        };

        current.shared.active.store(false, Ordering::SeqCst);
        current.timer.abort();
        if let Err(e) = self.inner.source.stop_watching(Some(current.watch)).await {
            log::warn!("Failed to stop position watch: {e}");
        }

        self.inner.state.set(TrackingState::Stopped);
        drop(session);
        log::info!("Tracking stopped");
    }

    /// Runs one publish cycle now, under the same single-flight guard as
    /// timer ticks.
    ///
    /// # Errors
    ///
    /// Returns the error that aborted the cycle: missing signer, missing
    /// encryption secret, or a position that cannot be encoded.
    pub async fn tick_now(&self) -> TrackingResult<TickOutcome> {
        let shared = {
            let session = self.inner.session.lock().await;
            session.as_ref().map(|s| Arc::clone(&s.shared))
        };
        let Some(shared) = shared else {
            return Ok(TickOutcome::NotTracking);
        };

        let Some(_permit) = TickPermit::try_acquire(&shared.in_flight) else {
            self.inner.record_skip();
            return Ok(TickOutcome::Skipped);
        };
        self.inner.run_tick(&shared).await
    }

    /// Supplies a delegated signer to the running session.
    ///
    /// Takes effect from the next cycle. Returns false if not tracking.
    pub async fn attach_signer(&self, signer: Arc<dyn DelegatedSigner>) -> bool {
        let session = self.inner.session.lock().await;
        let Some(current) = session.as_ref() else {
            return false;
        };
        let mut credentials = current
            .shared
            .credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *credentials = credentials.clone().with_delegated_signer(signer);
        true
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> TrackingState {
        self.inner.state.get()
    }

    /// Returns true while tracking.
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.state().is_tracking()
    }

    /// Observable lifecycle state.
    #[must_use]
    pub fn tracking(&self) -> &Observable<TrackingState> {
        &self.inner.state
    }

    /// Observable latest position reading.
    #[must_use]
    pub fn last_position(&self) -> &Observable<Option<Position>> {
        &self.inner.last_position
    }

    /// Observable time of the last cycle that got a record accepted.
    #[must_use]
    pub fn last_publish_time(&self) -> &Observable<Option<Timestamp>> {
        &self.inner.last_publish_time
    }

    /// Number of cycles dropped because another was in flight.
    #[must_use]
    pub fn skipped_ticks(&self) -> u64 {
        self.inner.skipped_ticks.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for TrackingController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackingController")
            .field("state", &self.inner.state.get())
            .field("skipped_ticks", &self.skipped_ticks())
            .finish_non_exhaustive()
    }
}

impl Inner {
    fn record_skip(&self) {
        self.skipped_ticks.fetch_add(1, Ordering::Relaxed);
        log::debug!("Skipping tick: previous cycle still in flight");
    }

    async fn run_tick(&self, session: &SessionState) -> TrackingResult<TickOutcome> {
        let Some(position) = self.last_position.get() else {
            log::debug!("Tick without a position, nothing to publish");
            return Ok(TickOutcome::NoPosition);
        };

        let config = self.config.get();
        let relays = self.relays.get();
        let now = self.clock.now();
        let credentials = session.credentials();

        let templates = self
            .builder
            .build(&position, &config, now, credentials.secret_keys())?;
        let mut report = TickReport::new(now);
        if templates.is_empty() {
            log::debug!("Encrypted mode with no recipients, nothing to publish");
            return Ok(TickOutcome::Completed(report));
        }

        let strategy = credentials.signing_strategy()?;
        for template in &templates {
            if !session.is_active() {
                log::debug!("Tracking stopped mid-cycle, dropping remaining records");
                break;
            }
            let event = match strategy.sign(template).await {
                Ok(event) => event,
                Err(e) => {
                    log::warn!("Failed to sign location record: {e}");
                    report.signing_failures += 1;
                    continue;
                }
            };
            if !session.is_active() {
                log::debug!("Tracking stopped mid-cycle, dropping signed record");
                break;
            }

            let result = self.publisher.publish(&event, &relays).await;
            if result.is_success() {
                self.last_publish_time.set(Some(now));
            }
            report.results.push(result);
        }
        Ok(TickOutcome::Completed(report))
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(session) = self.session.get_mut().take() {
            session.shared.active.store(false, Ordering::SeqCst);
            session.timer.abort();
        }
    }
}

async fn run_timer(
    inner: Weak<Inner>,
    session: Arc<SessionState>,
    first_tick: Instant,
    period: Duration,
) {
    let mut ticks = interval_at(first_tick, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticks.tick().await;
        if !session.is_active() {
            break;
        }
        let Some(inner) = inner.upgrade() else {
            break;
        };

        let Some(permit) = TickPermit::try_acquire(&session.in_flight) else {
            inner.record_skip();
            continue;
        };
        let session = Arc::clone(&session);
        // Cycles run in their own task so aborting the timer never cancels
        // a record halfway through publishing.
        tokio::spawn(async move {
            let _permit = permit;
            match inner.run_tick(&session).await {
                Ok(TickOutcome::Completed(report)) => log::debug!(
                    "Tick complete: {} of {} records published",
                    report.published_count(),
                    report.results.len()
                ),
                Ok(_) => {}
                Err(e) => log::error!("Tracking tick failed: {e}"),
            }
        });
    }
}
