use crate::domain::GeoPoint;
use crate::location::browser::PositionOptions;
use crate::location::native::WatchOptions;
use crate::location::{Platform, SimulatorConfig};
use config::{Config, ConfigError};
use serde::Deserialize;
use std::time::Duration;
use tracing::Level;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    core: Core,
    tracking: Tracking,
    simulator: SimulatorConfig,
    routing: Routing,
    preview: Option<Preview>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(config::File::with_name("config").required(true))
            .add_source(config::File::with_name("config_local").required(false))
            .add_source(config::Environment::with_prefix("STRIDE").separator("__"))
            .build()?
            .try_deserialize()
    }

    pub fn core(&self) -> &Core {
        &self.core
    }

    pub fn tracking(&self) -> &Tracking {
        &self.tracking
    }

    pub fn simulator(&self) -> &SimulatorConfig {
        &self.simulator
    }

    pub fn routing(&self) -> &Routing {
        &self.routing
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }
}

#[derive(Debug, Deserialize)]
pub struct Core {
    log_level: String,
}

impl Core {
    pub fn log_level(&self) -> Level {
        self.log_level.parse().unwrap_or(Level::INFO)
    }
}

#[derive(Debug, Deserialize)]
pub struct Tracking {
    platform: Platform,
    speed_window: usize,
    #[serde(default)]
    native: WatchOptions,
    #[serde(default)]
    browser: PositionOptions,
}

impl Tracking {
    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn speed_window(&self) -> usize {
        self.speed_window
    }

    pub fn native(&self) -> &WatchOptions {
        &self.native
    }

    pub fn browser(&self) -> &PositionOptions {
        &self.browser
    }
}

#[derive(Debug, Deserialize)]
pub struct Routing {
    url: String,
    api_key: Option<String>,
    timeout_ms: u64,
    max_retries: usize,
    retry_ms: u64,
    retry_max_delay_ms: u64,
    walking_speed_kmh: f64,
    search_limit: usize,
}

impl Routing {
    pub fn url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }

    pub fn timeout_ms(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    pub fn retry_ms(&self) -> u64 {
        self.retry_ms
    }

    pub fn retry_max_delay_ms(&self) -> Duration {
        Duration::from_millis(self.retry_max_delay_ms)
    }

    pub fn walking_speed_kmh(&self) -> f64 {
        self.walking_speed_kmh
    }

    pub fn search_limit(&self) -> usize {
        self.search_limit
    }
}

/// Route shown before tracking starts.
#[derive(Debug, Deserialize)]
pub struct Preview {
    origin: GeoPoint,
    destination: GeoPoint,
}

impl Preview {
    pub fn origin(&self) -> GeoPoint {
        self.origin
    }

    pub fn destination(&self) -> GeoPoint {
        self.destination
    }
}

#[cfg(test)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

#[cfg(test)]
impl AppConfigBuilder {
    pub fn new() -> Self {
        AppConfigBuilder {
            config: AppConfig {
                core: Core {
                    log_level: "info".to_string(),
                },
                tracking: Tracking {
                    platform: Platform::Simulated,
                    speed_window: 10,
                    native: WatchOptions::default(),
                    browser: PositionOptions::default(),
                },
                simulator: SimulatorConfig::default(),
                routing: Routing {
                    url: "https://routing.url".to_string(),
                    api_key: Some("key".to_string()),
                    timeout_ms: 2_000,
                    max_retries: 0,
                    retry_ms: 10,
                    retry_max_delay_ms: 50,
                    walking_speed_kmh: crate::routing::fallback::DEFAULT_WALKING_SPEED_KMH,
                    search_limit: 5,
                },
                preview: None,
            },
        }
    }

    pub fn routing_url(mut self, url: String) -> Self {
        self.config.routing.url = url;
        self
    }

    pub fn api_key(mut self, api_key: Option<String>) -> Self {
        self.config.routing.api_key = api_key;
        self
    }

    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.config.routing.max_retries = max_retries;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}
