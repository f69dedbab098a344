use crate::domain::RawLocation;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

pub type UpdateCallback = Arc<dyn Fn(RawLocation) + Send + Sync>;

/// Identifies a running watch of a location source.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct WatchHandle(u64);

/// A stream of position samples plus the permission handling that guards it.
///
/// Failures never surface as errors: a refused or unavailable sensor is reported as `false` or `None`.
#[async_trait]
pub trait LocationSource: Debug + Send + Sync {
    fn id(&self) -> &'static str;

    async fn request_permission(&self) -> bool;

    /// The current fix, if the source can provide one right away.
    async fn current_position(&self) -> Option<RawLocation>;

    /// Starts watching, delivering each new sample to `on_update`. Returns `None` if the sensor is unavailable.
    fn start(&self, on_update: UpdateCallback) -> Option<WatchHandle>;

    /// Detaches the watch before returning. Unknown or already stopped handles are ignored.
    fn stop(&self, handle: WatchHandle);
}

#[derive(Error, Debug)]
pub enum LocationApiError {
    #[error("location services are disabled")]
    ServicesDisabled,
    #[error("location permission was denied")]
    PermissionDenied,
    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// Bookkeeping of the watches a source has handed out.
#[derive(Debug)]
pub(crate) struct Watches<T> {
    next_id: AtomicU64,
    active: Mutex<HashMap<WatchHandle, T>>,
}

impl<T> Watches<T> {
    pub fn new() -> Self {
        Watches {
            next_id: AtomicU64::new(1),
            active: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert(&self, watch: T) -> WatchHandle {
        let handle = WatchHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().insert(handle, watch);
        handle
    }

    pub fn remove(&self, handle: WatchHandle) -> Option<T> {
        self.lock().remove(&handle)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[cfg(test)]
    pub fn all(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.lock().values().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<WatchHandle, T>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
