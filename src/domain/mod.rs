mod coordinate;
mod geo_point;
mod place;
mod route;
mod tracking_state;

pub use coordinate::{Coordinate, MalformedSample, Position, RawLocation};
pub use geo_point::GeoPoint;
pub use place::{Place, SearchOutcome, SearchSource};
pub use route::{Geometry, Measurement, RouteOutcome, RouteResult, RouteSource};
pub use tracking_state::TrackingState;
