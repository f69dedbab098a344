use crate::domain::RawLocation;
use crate::location::source::{LocationApiError, LocationSource, UpdateCallback, WatchHandle, Watches};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accuracy {
    Lowest,
    Low,
    Balanced,
    High,
    Highest,
    BestForNavigation,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct WatchOptions {
    pub accuracy: Accuracy,
    #[serde(with = "humantime_serde")]
    pub time_interval: Duration,
    pub distance_interval: f64, // In meters
}

impl Default for WatchOptions {
    fn default() -> Self {
        WatchOptions {
            accuracy: Accuracy::BestForNavigation,
            time_interval: Duration::from_secs(1),
            distance_interval: 1.0,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

/// A fix as reported by the device's location services.
#[derive(Clone, Copy, PartialEq, Default, Debug)]
pub struct NativeFix {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub speed: Option<f64>,
    pub accuracy: Option<f64>,
    pub heading: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<NativeFix> for RawLocation {
    fn from(fix: NativeFix) -> Self {
        RawLocation {
            latitude: Some(fix.latitude),
            longitude: Some(fix.longitude),
            altitude: fix.altitude,
            speed: fix.speed,
            accuracy: fix.accuracy,
            heading: fix.heading,
            timestamp: fix.timestamp,
        }
    }
}

pub type FixCallback = Box<dyn Fn(NativeFix) + Send + Sync>;

/// A registered continuous watch. Removing it releases the OS-level listener.
pub trait LocationSubscription: Debug + Send + Sync {
    fn remove(&self);
}

/// Binding to the device's location services.
#[async_trait]
pub trait NativeLocationApi: Debug + Send + Sync {
    async fn request_foreground_permissions(&self) -> Result<PermissionStatus, LocationApiError>;

    async fn current_position(&self, accuracy: Accuracy) -> Result<NativeFix, LocationApiError>;

    fn watch_position(&self, options: &WatchOptions, callback: FixCallback) -> Result<Box<dyn LocationSubscription>, LocationApiError>;
}

#[derive(Debug)]
pub struct NativeLocationSource {
    api: Arc<dyn NativeLocationApi>,
    options: WatchOptions,
    watches: Watches<Box<dyn LocationSubscription>>,
}

impl NativeLocationSource {
    pub fn new(api: Arc<dyn NativeLocationApi>, options: WatchOptions) -> Self {
        NativeLocationSource {
            api,
            options,
            watches: Watches::new(),
        }
    }
}

#[async_trait]
impl LocationSource for NativeLocationSource {
    fn id(&self) -> &'static str {
        "native"
    }

    #[instrument(skip_all)]
    async fn request_permission(&self) -> bool {
        debug!("📍 Requesting foreground location permission...");
        match self.api.request_foreground_permissions().await {
            Ok(PermissionStatus::Granted) => {
                debug!("📍 Requesting foreground location permission... OK");
                true
            }
            Ok(status) => {
                warn!(?status, "📍 Requesting foreground location permission... denied");
                false
            }
            Err(e) => {
                warn!("📍 Requesting foreground location permission... failed, {}", e);
                false
            }
        }
    }

    async fn current_position(&self) -> Option<RawLocation> {
        self.api
            .current_position(self.options.accuracy)
            .await
            .inspect_err(|e| debug!("📍 No initial fix available: {}", e))
            .ok()
            .map(RawLocation::from)
    }

    fn start(&self, on_update: UpdateCallback) -> Option<WatchHandle> {
        let callback: FixCallback = Box::new(move |fix| on_update(RawLocation::from(fix)));

        match self.api.watch_position(&self.options, callback) {
            Ok(subscription) => {
                let handle = self.watches.insert(subscription);
                info!(?handle, options = ?self.options, "📍 Watching native location");
                Some(handle)
            }
            Err(e) => {
                warn!("📍 Unable to watch native location: {}", e);
                None
            }
        }
    }

    fn stop(&self, handle: WatchHandle) {
        if let Some(subscription) = self.watches.remove(handle) {
            subscription.remove();
            info!(?handle, "📍 Stopped watching native location");
        }
    }
}
