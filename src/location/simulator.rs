use crate::domain::{GeoPoint, RawLocation};
use crate::location::source::{LocationSource, UpdateCallback, WatchHandle, Watches};
use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::{Instant, interval_at};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::IntervalStream;
use tracing::{debug, info, warn};

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct SimulatorConfig {
    pub origin: GeoPoint,
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    pub max_delta: f64, // In degrees
    pub min_speed: f64, // In meters per second
    pub max_speed: f64, // In meters per second
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        SimulatorConfig {
            origin: GeoPoint::new(52.3676, 4.9041),
            interval: Duration::from_secs(1),
            max_delta: 0.0001,
            min_speed: 2.0,
            max_speed: 4.0,
            seed: None,
        }
    }
}

#[derive(Debug)]
struct SimulatedWatch {
    active: Arc<AtomicBool>,
    task: AbortHandle,
}

/// Synthetic location source that wanders around from its last position on a fixed interval.
#[derive(Debug)]
pub struct MockSimulator {
    config: SimulatorConfig,
    position: Arc<Mutex<GeoPoint>>,
    watches: Watches<SimulatedWatch>,
}

impl MockSimulator {
    pub fn new(config: SimulatorConfig) -> Self {
        let position = Arc::new(Mutex::new(config.origin));
        MockSimulator {
            config,
            position,
            watches: Watches::new(),
        }
    }

    pub fn active_watches(&self) -> usize {
        self.watches.len()
    }

    fn rng(&self) -> StdRng {
        self.config.seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64)
    }
}

#[async_trait]
impl LocationSource for MockSimulator {
    fn id(&self) -> &'static str {
        "simulator"
    }

    async fn request_permission(&self) -> bool {
        true
    }

    async fn current_position(&self) -> Option<RawLocation> {
        let position = *self.position.lock().unwrap_or_else(PoisonError::into_inner);
        Some(RawLocation::at(position.latitude, position.longitude).timestamp(Utc::now()))
    }

    fn start(&self, on_update: UpdateCallback) -> Option<WatchHandle> {
        let Ok(runtime) = Handle::try_current() else {
            warn!("📍 Unable to start the simulator outside of a tokio runtime");
            return None;
        };

        let active = Arc::new(AtomicBool::new(true));
        let task = runtime.spawn(emit_fixes(
            self.config.clone(),
            self.position.clone(),
            self.rng(),
            active.clone(),
            on_update,
        ));

        let handle = self.watches.insert(SimulatedWatch {
            active,
            task: task.abort_handle(),
        });
        info!(?handle, interval = ?self.config.interval, "📍 Started location simulator");
        Some(handle)
    }

    fn stop(&self, handle: WatchHandle) {
        if let Some(watch) = self.watches.remove(handle) {
            watch.active.store(false, Ordering::SeqCst);
            watch.task.abort();
            info!(?handle, "📍 Stopped location simulator");
        }
    }
}

async fn emit_fixes(config: SimulatorConfig, position: Arc<Mutex<GeoPoint>>, mut rng: StdRng, active: Arc<AtomicBool>, on_update: UpdateCallback) {
    let period = config.interval;
    let mut ticks = IntervalStream::new(interval_at(Instant::now() + period, period));

    while ticks.next().await.is_some() {
        // A stop may have raced with this tick
        if !active.load(Ordering::SeqCst) {
            break;
        }

        let raw = {
            let mut position = position.lock().unwrap_or_else(PoisonError::into_inner);
            *position = wander(*position, config.max_delta, &mut rng);
            let speed = rng.random_range(config.min_speed.min(config.max_speed)..=config.max_speed.max(config.min_speed));
            RawLocation::at(position.latitude, position.longitude).speed(speed).timestamp(Utc::now())
        };

        debug!(latitude = raw.latitude, longitude = raw.longitude, "📍 Simulated fix");
        on_update(raw);
    }
}

fn wander(from: GeoPoint, max_delta: f64, rng: &mut StdRng) -> GeoPoint {
    let max_delta = max_delta.abs();
    let latitude = (from.latitude + rng.random_range(-max_delta..=max_delta)).clamp(-90.0, 90.0);
    let mut longitude = from.longitude + rng.random_range(-max_delta..=max_delta);
    if longitude > 180.0 {
        longitude -= 360.0;
    } else if longitude < -180.0 {
        longitude += 360.0;
    }

    GeoPoint::new(latitude, longitude)
}
