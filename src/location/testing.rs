use crate::domain::RawLocation;
use crate::location::browser::{
    Geolocation, GeolocationCoordinates, GeolocationPosition, PositionCallback, PositionError, PositionErrorCallback, PositionOptions, WatchId,
};
use crate::location::factory::LocationSourceFactory;
use crate::location::native::{Accuracy, FixCallback, LocationSubscription, NativeFix, NativeLocationApi, PermissionStatus, WatchOptions};
use crate::location::source::{LocationApiError, LocationSource, UpdateCallback, WatchHandle, Watches};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type Callbacks<T> = Arc<Mutex<HashMap<usize, T>>>;
type SharedFixCallback = Arc<dyn Fn(NativeFix) + Send + Sync>;

pub struct FakeNativeApi {
    permission: Mutex<Option<Result<PermissionStatus, LocationApiError>>>,
    fail_watch: bool,
    callbacks: Callbacks<SharedFixCallback>,
    next_id: AtomicUsize,
    removals: Arc<AtomicUsize>,
    last_options: Mutex<Option<WatchOptions>>,
}

impl FakeNativeApi {
    pub fn new(permission: Result<PermissionStatus, LocationApiError>) -> Self {
        FakeNativeApi {
            permission: Mutex::new(Some(permission)),
            fail_watch: false,
            callbacks: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicUsize::new(0),
            removals: Arc::new(AtomicUsize::new(0)),
            last_options: Mutex::new(None),
        }
    }

    pub fn failing_watch(mut self) -> Self {
        self.fail_watch = true;
        self
    }

    /// Delivers a fix to every live watch. Callbacks are collected first so they can remove their subscription.
    pub fn emit(&self, fix: NativeFix) {
        let callbacks: Vec<SharedFixCallback> = self.callbacks.lock().unwrap().values().cloned().collect();
        for callback in callbacks {
            callback(fix);
        }
    }

    pub fn live_watches(&self) -> usize {
        self.callbacks.lock().unwrap().len()
    }

    pub fn removals(&self) -> usize {
        self.removals.load(Ordering::SeqCst)
    }

    pub fn last_options(&self) -> Option<WatchOptions> {
        self.last_options.lock().unwrap().clone()
    }
}

impl Debug for FakeNativeApi {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeNativeApi").field("live_watches", &self.live_watches()).finish()
    }
}

#[async_trait]
impl NativeLocationApi for FakeNativeApi {
    async fn request_foreground_permissions(&self) -> Result<PermissionStatus, LocationApiError> {
        match self.permission.lock().unwrap().as_ref() {
            Some(Ok(status)) => Ok(*status),
            _ => Err(LocationApiError::ServicesDisabled),
        }
    }

    async fn current_position(&self, _accuracy: Accuracy) -> Result<NativeFix, LocationApiError> {
        Err(LocationApiError::Unavailable("no fix yet".to_string()))
    }

    fn watch_position(&self, options: &WatchOptions, callback: FixCallback) -> Result<Box<dyn LocationSubscription>, LocationApiError> {
        if self.fail_watch {
            return Err(LocationApiError::Unavailable("watch failed".to_string()));
        }

        *self.last_options.lock().unwrap() = Some(options.clone());
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.callbacks.lock().unwrap().insert(id, Arc::from(callback));

        Ok(Box::new(FakeSubscription {
            id,
            callbacks: self.callbacks.clone(),
            removals: self.removals.clone(),
        }))
    }
}

struct FakeSubscription {
    id: usize,
    callbacks: Callbacks<SharedFixCallback>,
    removals: Arc<AtomicUsize>,
}

impl Debug for FakeSubscription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeSubscription").field("id", &self.id).finish()
    }
}

impl LocationSubscription for FakeSubscription {
    fn remove(&self) {
        if self.callbacks.lock().unwrap().remove(&self.id).is_some() {
            self.removals.fetch_add(1, Ordering::SeqCst);
        }
    }
}

type GeolocationWatch = (Arc<dyn Fn(GeolocationPosition) + Send + Sync>, Arc<dyn Fn(PositionError) + Send + Sync>);

pub struct FakeGeolocation {
    supported: bool,
    current: Result<GeolocationPosition, PositionError>,
    watches: Mutex<HashMap<WatchId, GeolocationWatch>>,
    next_id: AtomicUsize,
    cleared: AtomicUsize,
}

impl FakeGeolocation {
    pub fn new(current: Result<GeolocationPosition, PositionError>) -> Self {
        FakeGeolocation {
            supported: true,
            current,
            watches: Mutex::new(HashMap::new()),
            next_id: AtomicUsize::new(1),
            cleared: AtomicUsize::new(0),
        }
    }

    pub fn unsupported() -> Self {
        FakeGeolocation {
            supported: false,
            ..FakeGeolocation::new(Ok(GeolocationPosition::default()))
        }
    }

    pub fn emit(&self, coords: GeolocationCoordinates) {
        let watches: Vec<GeolocationWatch> = self.watches.lock().unwrap().values().cloned().collect();
        for (on_position, _) in watches {
            on_position(GeolocationPosition { coords, timestamp: 0 });
        }
    }

    pub fn emit_error(&self, error: PositionError) {
        let watches: Vec<GeolocationWatch> = self.watches.lock().unwrap().values().cloned().collect();
        for (_, on_error) in watches {
            on_error(error.clone());
        }
    }

    pub fn live_watches(&self) -> usize {
        self.watches.lock().unwrap().len()
    }

    pub fn cleared(&self) -> usize {
        self.cleared.load(Ordering::SeqCst)
    }
}

impl Debug for FakeGeolocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeGeolocation").field("supported", &self.supported).finish()
    }
}

#[async_trait]
impl Geolocation for FakeGeolocation {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn get_current_position(&self, _options: &PositionOptions) -> Result<GeolocationPosition, PositionError> {
        self.current.clone()
    }

    fn watch_position(&self, on_position: PositionCallback, on_error: PositionErrorCallback, _options: &PositionOptions) -> WatchId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as WatchId;
        self.watches.lock().unwrap().insert(id, (Arc::from(on_position), Arc::from(on_error)));
        id
    }

    fn clear_watch(&self, id: WatchId) {
        if self.watches.lock().unwrap().remove(&id).is_some() {
            self.cleared.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// A source driven by hand: tests push samples through `emit`.
pub struct FakeSource {
    permission: bool,
    initial: Option<RawLocation>,
    available: AtomicBool,
    watches: Watches<UpdateCallback>,
    stops: AtomicUsize,
    on_start: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl FakeSource {
    pub fn granted() -> Self {
        FakeSource {
            permission: true,
            initial: None,
            available: AtomicBool::new(true),
            watches: Watches::new(),
            stops: AtomicUsize::new(0),
            on_start: Mutex::new(None),
        }
    }

    pub fn denied() -> Self {
        FakeSource {
            permission: false,
            ..FakeSource::granted()
        }
    }

    pub fn unavailable() -> Self {
        FakeSource {
            available: AtomicBool::new(false),
            ..FakeSource::granted()
        }
    }

    pub fn with_initial_fix(mut self, initial: RawLocation) -> Self {
        self.initial = Some(initial);
        self
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Runs `hook` once, the next time a watch is requested.
    pub fn before_next_start(&self, hook: impl FnOnce() + Send + 'static) {
        *self.on_start.lock().unwrap() = Some(Box::new(hook));
    }

    /// Delivers a sample to every live watch. Callbacks are collected first so they can stop the watch.
    pub fn emit(&self, raw: RawLocation) {
        let callbacks: Vec<UpdateCallback> = self.watches.all();
        for callback in callbacks {
            callback(raw);
        }
    }

    pub fn live_watches(&self) -> usize {
        self.watches.len()
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl Debug for FakeSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeSource").field("live_watches", &self.live_watches()).finish()
    }
}

#[async_trait]
impl LocationSource for FakeSource {
    fn id(&self) -> &'static str {
        "fake"
    }

    async fn request_permission(&self) -> bool {
        self.permission
    }

    async fn current_position(&self) -> Option<RawLocation> {
        self.initial
    }

    fn start(&self, on_update: UpdateCallback) -> Option<WatchHandle> {
        let hook = self.on_start.lock().unwrap().take();
        if let Some(hook) = hook {
            hook();
        }

        self.available.load(Ordering::SeqCst).then(|| self.watches.insert(on_update))
    }

    fn stop(&self, handle: WatchHandle) {
        if self.watches.remove(handle).is_some() {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[derive(Debug)]
pub struct StaticFactory(pub Option<Arc<dyn LocationSource>>);

impl LocationSourceFactory for StaticFactory {
    fn create(&self) -> Option<Arc<dyn LocationSource>> {
        self.0.clone()
    }
}
