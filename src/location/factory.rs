use crate::location::browser::{BrowserLocationSource, Geolocation, PositionOptions};
use crate::location::native::{NativeLocationApi, NativeLocationSource, WatchOptions};
use crate::location::simulator::{MockSimulator, SimulatorConfig};
use crate::location::source::LocationSource;
use serde::Deserialize;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Native,
    Browser,
    Simulated,
}

pub trait LocationSourceFactory: Debug + Send + Sync {
    /// The source to use for the next tracking run, or `None` if this platform has no location sensor.
    fn create(&self) -> Option<Arc<dyn LocationSource>>;
}

/// Picks the source matching the platform the app runs on.
#[derive(Debug)]
pub struct PlatformSourceFactory {
    platform: Platform,
    native: Option<Arc<NativeLocationSource>>,
    browser: Option<Arc<BrowserLocationSource>>,
    simulator: Option<Arc<MockSimulator>>,
}

impl PlatformSourceFactory {
    pub fn new(platform: Platform) -> Self {
        PlatformSourceFactory {
            platform,
            native: None,
            browser: None,
            simulator: None,
        }
    }

    pub fn native(mut self, api: Arc<dyn NativeLocationApi>, options: WatchOptions) -> Self {
        self.native = Some(Arc::new(NativeLocationSource::new(api, options)));
        self
    }

    pub fn browser(mut self, geolocation: Arc<dyn Geolocation>, options: PositionOptions) -> Self {
        self.browser = Some(Arc::new(BrowserLocationSource::new(geolocation, options)));
        self
    }

    pub fn simulator(mut self, config: SimulatorConfig) -> Self {
        self.simulator = Some(Arc::new(MockSimulator::new(config)));
        self
    }
}

impl LocationSourceFactory for PlatformSourceFactory {
    fn create(&self) -> Option<Arc<dyn LocationSource>> {
        let source: Option<Arc<dyn LocationSource>> = match self.platform {
            Platform::Native => self.native.clone().map(|source| source as Arc<dyn LocationSource>),
            Platform::Browser => self.browser.clone().map(|source| source as Arc<dyn LocationSource>),
            Platform::Simulated => self.simulator.clone().map(|source| source as Arc<dyn LocationSource>),
        };

        match &source {
            Some(source) => debug!(platform = ?self.platform, "📍 Selected location source '{}'", source.id()),
            None => warn!(platform = ?self.platform, "📍 No location source available for this platform"),
        }
        source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::native::PermissionStatus;
    use crate::location::testing::{FakeGeolocation, FakeNativeApi};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn factory(platform: Platform) -> PlatformSourceFactory {
        PlatformSourceFactory::new(platform)
            .native(Arc::new(FakeNativeApi::new(Ok(PermissionStatus::Granted))), WatchOptions::default())
            .browser(Arc::new(FakeGeolocation::unsupported()), PositionOptions::default())
            .simulator(SimulatorConfig::default())
    }

    #[rstest]
    #[case(Platform::Native, "native")]
    #[case(Platform::Browser, "browser")]
    #[case(Platform::Simulated, "simulator")]
    fn creates_the_source_for_the_platform(#[case] platform: Platform, #[case] id: &str) {
        let source = factory(platform).create();

        assert_eq!(source.map(|source| source.id()), Some(id));
    }

    #[test]
    fn creates_nothing_without_a_binding_for_the_platform() {
        let factory = PlatformSourceFactory::new(Platform::Native).simulator(SimulatorConfig::default());

        assert!(factory.create().is_none());
    }

    #[test]
    fn reuses_the_same_source_across_runs() {
        let factory = factory(Platform::Simulated);

        let first = factory.create().unwrap();
        let second = factory.create().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn deserializes_the_platform() -> Result<(), serde_json::Error> {
        assert_eq!(serde_json::from_str::<Platform>(r#""simulated""#)?, Platform::Simulated);
        Ok(())
    }
}
