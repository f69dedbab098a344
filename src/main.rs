use chrono::Utc;
use std::sync::Arc;
use stride::app_config::AppConfig;
use stride::clock::SystemClock;
use stride::domain::{Coordinate, RouteSource};
use stride::location::PlatformSourceFactory;
use stride::routing::{self, RouteService};
use stride::tracking::{Notifier, TrackingSession};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Arc::new(AppConfig::load()?);
    tracing_subscriber::fmt().with_max_level(config.core().log_level()).init();

    info!("🪵 Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    info!("✅  Loaded configuration");

    let route_service = RouteService::new(routing::new_client(&config)?, config.clone());
    info!("✅  Initialized routing client");

    if let Some(preview) = config.preview() {
        let now = Utc::now();
        let coordinates = [Coordinate::at(preview.origin(), now), Coordinate::at(preview.destination(), now)];
        match route_service.get_route(&coordinates).await {
            Ok(outcome) => {
                let source = match &outcome.source {
                    RouteSource::Remote => "remote",
                    RouteSource::Fallback { .. } => "fallback",
                };
                info!(source, "🗺️ Route preview: {}, {}", outcome.route.distance.text, outcome.route.duration.text);
            }
            Err(e) => warn!("⚠️ Unable to preview route: {}", e),
        }
    }

    // Native and browser bindings are provided by the host application, standalone runs use the simulator
    let factory = PlatformSourceFactory::new(config.tracking().platform()).simulator(config.simulator().clone());
    let session = TrackingSession::new(Arc::new(factory), Arc::new(SystemClock), Notifier::new(), config.tracking().speed_window());

    let subscription = session.subscribe(|state| {
        info!(
            coordinates = state.coordinates.len(),
            speed_mps = state.speed,
            average_speed_mps = state.average_speed,
            "🏃 {:.3} km",
            state.distance
        );
    });

    if !session.start().await {
        error!("❌ Unable to start tracking, check the location permission and platform");
        return Err("tracking could not be started".into());
    }
    info!("🔥 {} is up and running, press Ctrl-C to stop", env!("CARGO_PKG_NAME"));

    tokio::signal::ctrl_c().await?;
    session.stop();
    subscription.unsubscribe();

    let state = session.get_state();
    info!(
        coordinates = state.coordinates.len(),
        average_speed_mps = state.average_speed,
        "🏁 Finished run, {:.3} km",
        state.distance
    );

    Ok(())
}
