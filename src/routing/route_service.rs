use crate::app_config::AppConfig;
use crate::domain::{Coordinate, RouteOutcome, RouteResult, RouteSource};
use crate::routing::api::{RouteRequest, RouteResponse};
use crate::routing::fallback::straight_line_route;
use reqwest::Client;
use std::sync::Arc;
use thiserror::Error;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, instrument, warn};

/// Client of the remote routing and geocoding API. Network failures never reach the caller, they are replaced by
/// locally computed results tagged as fallbacks.
#[derive(Debug, Clone)]
pub struct RouteService {
    pub(super) client: Client,
    pub(super) config: Arc<AppConfig>,
}

impl RouteService {
    pub fn new(client: Client, config: Arc<AppConfig>) -> Self {
        RouteService { client, config }
    }

    /// Walking route from the first to the last coordinate.
    #[instrument(skip_all, fields(coordinates = coordinates.len()))]
    pub async fn get_route(&self, coordinates: &[Coordinate]) -> Result<RouteOutcome, RouteError> {
        let (origin, destination) = match coordinates {
            [origin, .., destination] => (origin, destination),
            _ => return Err(RouteError::InvalidInput { count: coordinates.len() }),
        };

        info!("🗺️ Requesting walking route...");
        match self.request_route_with_retry(origin, destination).await {
            Ok(route) => {
                info!(distance_m = route.distance.value, duration_s = route.duration.value, "🗺️ Requesting walking route... OK");
                Ok(RouteOutcome {
                    route,
                    source: RouteSource::Remote,
                })
            }
            Err(e) => {
                warn!("🗺️ Requesting walking route... failed, {}. Falling back to a straight line", e);
                let route = straight_line_route(origin, destination, self.config.routing().walking_speed_kmh());
                Ok(RouteOutcome {
                    route,
                    source: RouteSource::Fallback { reason: e.to_string() },
                })
            }
        }
    }

    async fn request_route_with_retry(&self, origin: &Coordinate, destination: &Coordinate) -> Result<RouteResult, RouteRequestError> {
        let routing = self.config.routing();
        let strategy = ExponentialBackoff::from_millis(routing.retry_ms())
            .factor(2)
            .max_delay(routing.retry_max_delay_ms())
            .map(jitter)
            .take(routing.max_retries());

        Retry::spawn(strategy, || async move {
            self.request_route(origin, destination).await.inspect_err(|e| debug!("🗺️ Route request attempt failed: {}", e))
        })
        .await
    }

    async fn request_route(&self, origin: &Coordinate, destination: &Coordinate) -> Result<RouteResult, RouteRequestError> {
        let response = self
            .client
            .post(format!("{}/route/distance", self.config.routing().url()))
            .json(&RouteRequest::walking(origin, destination))
            .send()
            .await?
            .error_for_status()?;

        let route_response = response.json::<RouteResponse>().await?;
        route_response.routes.into_iter().next().map(RouteResult::from).ok_or(RouteRequestError::NoRoute)
    }
}

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("a route needs at least two coordinates, got {count}")]
    InvalidInput { count: usize },
}

#[derive(Error, Debug)]
pub(super) enum RouteRequestError {
    #[error("request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("the response contained no route")]
    NoRoute,
}
