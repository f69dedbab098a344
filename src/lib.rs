pub mod app_config;
pub mod clock;
pub mod distance;
pub mod domain;
mod geo_point_deserializer;
pub mod location;
pub mod routing;
pub mod speed_estimator;
pub mod tracking;
