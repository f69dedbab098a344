pub mod browser;
pub mod factory;
pub mod native;
pub mod simulator;
mod source;
#[cfg(test)]
pub mod testing;

pub use factory::{LocationSourceFactory, Platform, PlatformSourceFactory};
pub use simulator::{MockSimulator, SimulatorConfig};
pub use source::{LocationApiError, LocationSource, UpdateCallback, WatchHandle};
