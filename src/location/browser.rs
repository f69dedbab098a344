use crate::domain::RawLocation;
use crate::location::source::{LocationSource, UpdateCallback, WatchHandle, Watches};
use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        PositionOptions {
            enable_high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::ZERO,
        }
    }
}

// API: https://developer.mozilla.org/en-US/docs/Web/API/GeolocationCoordinates
#[derive(Clone, Copy, PartialEq, Default, Debug)]
pub struct GeolocationCoordinates {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
    pub accuracy: Option<f64>,
    pub heading: Option<f64>,
    pub speed: Option<f64>,
}

#[derive(Clone, Copy, PartialEq, Default, Debug)]
pub struct GeolocationPosition {
    pub coords: GeolocationCoordinates,
    pub timestamp: i64, // Milliseconds since the Unix epoch
}

impl From<GeolocationPosition> for RawLocation {
    fn from(position: GeolocationPosition) -> Self {
        RawLocation {
            latitude: position.coords.latitude,
            longitude: position.coords.longitude,
            altitude: position.coords.altitude,
            speed: position.coords.speed,
            accuracy: position.coords.accuracy,
            heading: position.coords.heading,
            timestamp: DateTime::from_timestamp_millis(position.timestamp),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PositionErrorCode {
    PermissionDenied = 1,
    PositionUnavailable = 2,
    Timeout = 3,
}

#[derive(Error, Clone, PartialEq, Debug)]
#[error("{code:?}: {message}")]
pub struct PositionError {
    pub code: PositionErrorCode,
    pub message: String,
}

pub type WatchId = i64;
pub type PositionCallback = Box<dyn Fn(GeolocationPosition) + Send + Sync>;
pub type PositionErrorCallback = Box<dyn Fn(PositionError) + Send + Sync>;

/// Binding to the browser's `navigator.geolocation` capability.
#[async_trait]
pub trait Geolocation: Debug + Send + Sync {
    fn is_supported(&self) -> bool;

    async fn get_current_position(&self, options: &PositionOptions) -> Result<GeolocationPosition, PositionError>;

    fn watch_position(&self, on_position: PositionCallback, on_error: PositionErrorCallback, options: &PositionOptions) -> WatchId;

    fn clear_watch(&self, id: WatchId);
}

#[derive(Debug)]
pub struct BrowserLocationSource {
    geolocation: Arc<dyn Geolocation>,
    options: PositionOptions,
    watches: Watches<WatchId>,
}

impl BrowserLocationSource {
    pub fn new(geolocation: Arc<dyn Geolocation>, options: PositionOptions) -> Self {
        BrowserLocationSource {
            geolocation,
            options,
            watches: Watches::new(),
        }
    }
}

#[async_trait]
impl LocationSource for BrowserLocationSource {
    fn id(&self) -> &'static str {
        "browser"
    }

    // Browsers prompt for permission on the first position request
    #[instrument(skip_all)]
    async fn request_permission(&self) -> bool {
        if !self.geolocation.is_supported() {
            warn!("📍 Requesting geolocation permission... failed, geolocation is not supported");
            return false;
        }

        debug!("📍 Requesting geolocation permission...");
        match self.geolocation.get_current_position(&self.options).await {
            Ok(_) => {
                debug!("📍 Requesting geolocation permission... OK");
                true
            }
            Err(e) if e.code == PositionErrorCode::PermissionDenied => {
                warn!("📍 Requesting geolocation permission... denied, {}", e.message);
                false
            }
            Err(e) => {
                debug!("📍 Requesting geolocation permission... OK, but no position yet: {}", e);
                true
            }
        }
    }

    async fn current_position(&self) -> Option<RawLocation> {
        if !self.geolocation.is_supported() {
            return None;
        }

        self.geolocation
            .get_current_position(&self.options)
            .await
            .inspect_err(|e| debug!("📍 No initial fix available: {}", e))
            .ok()
            .map(RawLocation::from)
    }

    fn start(&self, on_update: UpdateCallback) -> Option<WatchHandle> {
        if !self.geolocation.is_supported() {
            warn!("📍 Unable to watch geolocation, geolocation is not supported");
            return None;
        }

        let on_position: PositionCallback = Box::new(move |position| on_update(RawLocation::from(position)));
        let on_error: PositionErrorCallback = Box::new(|e| warn!("⚠️ Geolocation watch error: {}", e));
        let watch_id = self.geolocation.watch_position(on_position, on_error, &self.options);

        let handle = self.watches.insert(watch_id);
        info!(?handle, watch_id, "📍 Watching geolocation");
        Some(handle)
    }

    fn stop(&self, handle: WatchHandle) {
        if let Some(watch_id) = self.watches.remove(handle) {
            self.geolocation.clear_watch(watch_id);
            info!(?handle, watch_id, "📍 Stopped watching geolocation");
        }
    }
}
