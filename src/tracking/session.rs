use crate::clock::Clock;
use crate::distance;
use crate::domain::{Position, RawLocation, TrackingState};
use crate::location::{LocationSource, LocationSourceFactory, UpdateCallback, WatchHandle};
use crate::speed_estimator::SpeedEstimator;
use crate::tracking::notifier::{Notifier, Subscription};
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, info, instrument, trace, warn};

struct ActiveWatch {
    source: Arc<dyn LocationSource>,
    handle: WatchHandle,
}

impl ActiveWatch {
    fn detach(self) {
        self.source.stop(self.handle);
    }
}

struct SessionState {
    snapshot: TrackingState,
    speed: SpeedEstimator,
    watch: Option<ActiveWatch>,
}

struct Shared {
    factory: Arc<dyn LocationSourceFactory>,
    clock: Arc<dyn Clock>,
    notifier: Notifier,
    starting: tokio::sync::Mutex<()>,
    state: Mutex<SessionState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn handle_update(&self, raw: RawLocation) {
        let snapshot = {
            let mut state = self.lock();
            if !state.snapshot.is_tracking {
                trace!("📍 Ignoring sample, not tracking");
                return;
            }

            if !self.apply(&mut state, raw) {
                return;
            }
            state.snapshot.clone()
        };

        self.notifier.publish(&snapshot);
    }

    /// Folds a sample into the accumulated state. Returns false if the sample was dropped.
    fn apply(&self, state: &mut SessionState, raw: RawLocation) -> bool {
        let position = match Position::try_from(raw) {
            Ok(position) => position,
            Err(e) => {
                warn!("⚠️ Dropping malformed sample: {}", e);
                return false;
            }
        };

        let coordinate = position.to_coordinate(self.clock.now());
        let added = distance::accumulate(state.snapshot.last_coordinate(), &coordinate);

        state.speed.push(position.speed);
        let snapshot = &mut state.snapshot;
        snapshot.distance += added;
        snapshot.speed = position.speed.filter(|speed| speed.is_finite() && *speed >= 0.0).unwrap_or(0.0);
        snapshot.average_speed = state.speed.average();
        snapshot.coordinates.push(coordinate);
        snapshot.current_location = Some(position);

        trace!(
            latitude = coordinate.latitude(),
            longitude = coordinate.longitude(),
            added_km = added,
            distance_km = snapshot.distance,
            "📍 Accepted sample"
        );
        true
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let watch = self.state.get_mut().unwrap_or_else(PoisonError::into_inner).watch.take();
        if let Some(watch) = watch {
            watch.detach();
        }
    }
}

/// Accumulates the coordinate log, distance and speed of a run from a location source.
///
/// Cloning yields another handle to the same session. Subscribers are notified after the session lock is released and
/// may call back into the session, for example to stop it once a goal is reached.
#[derive(Clone)]
pub struct TrackingSession {
    shared: Arc<Shared>,
}

impl TrackingSession {
    pub fn new(factory: Arc<dyn LocationSourceFactory>, clock: Arc<dyn Clock>, notifier: Notifier, speed_window: usize) -> Self {
        TrackingSession {
            shared: Arc::new(Shared {
                factory,
                clock,
                notifier,
                starting: tokio::sync::Mutex::new(()),
                state: Mutex::new(SessionState {
                    snapshot: TrackingState::default(),
                    speed: SpeedEstimator::new(speed_window),
                    watch: None,
                }),
            }),
        }
    }

    /// Starts tracking. Returns false if there is no location sensor or permission was refused, leaving the state
    /// untouched. Starting an active session is a no-op.
    #[instrument(skip_all)]
    pub async fn start(&self) -> bool {
        let _starting = self.shared.starting.lock().await;
        if self.shared.lock().snapshot.is_tracking {
            debug!("▶️ Already tracking");
            return true;
        }

        let Some(source) = self.shared.factory.create() else {
            warn!("▶️ Starting tracking... failed, no location sensor available");
            return false;
        };

        info!(source = source.id(), "▶️ Starting tracking...");
        if !source.request_permission().await {
            warn!(source = source.id(), "▶️ Starting tracking... failed, location permission denied");
            return false;
        }

        let initial = source.current_position().await;
        let (previous_snapshot, previous_speed) = {
            let mut state = self.shared.lock();
            let previous = (state.snapshot.clone(), state.speed.clone());
            state.snapshot.is_tracking = true;
            if let Some(raw) = initial {
                self.shared.apply(&mut state, raw);
            }
            previous
        };

        let Some(handle) = source.start(self.update_callback()) else {
            let mut state = self.shared.lock();
            // A stop or reset in the meantime wins over the restore
            if state.snapshot.is_tracking {
                state.snapshot = previous_snapshot;
                state.speed = previous_speed;
            }
            warn!(source = source.id(), "▶️ Starting tracking... failed, location sensor unavailable");
            return false;
        };

        let mut state = self.shared.lock();
        if !state.snapshot.is_tracking {
            drop(state);
            source.stop(handle);
            warn!(source = source.id(), "▶️ Starting tracking... aborted, stopped while starting");
            return false;
        }

        state.watch = Some(ActiveWatch { source, handle });
        let snapshot = state.snapshot.clone();
        drop(state);

        info!(coordinates = snapshot.coordinates.len(), "▶️ Starting tracking... OK");
        self.shared.notifier.publish(&snapshot);
        true
    }

    /// Detaches from the location source before returning. Safe to call in any state.
    #[instrument(skip_all)]
    pub fn stop(&self) {
        let (watch, last) = {
            let mut state = self.shared.lock();
            let was_tracking = std::mem::replace(&mut state.snapshot.is_tracking, false);
            (state.watch.take(), was_tracking.then(|| state.snapshot.clone()))
        };

        if let Some(watch) = watch {
            watch.detach();
        }

        if let Some(snapshot) = last {
            info!(distance_km = snapshot.distance, coordinates = snapshot.coordinates.len(), "⏹️ Stopped tracking");
            self.shared.notifier.publish(&snapshot);
        }
    }

    /// Stops tracking and clears everything accumulated so far, publishing the empty state once.
    #[instrument(skip_all)]
    pub fn reset(&self) {
        let watch = {
            let mut state = self.shared.lock();
            state.snapshot = TrackingState::default();
            state.speed.clear();
            state.watch.take()
        };

        if let Some(watch) = watch {
            watch.detach();
        }
        info!("🔄 Reset tracking session");
        self.shared.notifier.publish(&TrackingState::default());
    }

    pub fn handle_update(&self, raw: RawLocation) {
        self.shared.handle_update(raw);
    }

    pub fn get_state(&self) -> TrackingState {
        self.shared.lock().snapshot.clone()
    }

    pub fn is_tracking(&self) -> bool {
        self.shared.lock().snapshot.is_tracking
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&TrackingState) + Send + Sync + 'static,
    {
        self.shared.notifier.subscribe(callback)
    }

    fn update_callback(&self) -> UpdateCallback {
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        Arc::new(move |raw: RawLocation| {
            if let Some(shared) = shared.upgrade() {
                shared.handle_update(raw);
            }
        })
    }
}

impl Debug for TrackingSession {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("TrackingSession")
            .field("is_tracking", &state.snapshot.is_tracking)
            .field("coordinates", &state.snapshot.coordinates.len())
            .field("distance", &state.snapshot.distance)
            .finish()
    }
}
