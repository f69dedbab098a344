mod api;
mod client;
pub mod fallback;
mod route_service;
mod search;

pub use client::{RoutingClientError, new_client};
pub use route_service::{RouteError, RouteService};
