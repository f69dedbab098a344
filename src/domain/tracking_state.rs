use crate::domain::{Coordinate, Position};
use serde::Serialize;

/// Snapshot of a tracking session as handed to subscribers.
#[derive(Clone, PartialEq, Default, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingState {
    pub is_tracking: bool,
    pub coordinates: Vec<Coordinate>,
    pub current_location: Option<Position>,
    pub distance: f64,      // In kilometers
    pub speed: f64,         // In meters per second
    pub average_speed: f64, // In meters per second
}

impl TrackingState {
    pub fn last_coordinate(&self) -> Option<&Coordinate> {
        self.coordinates.last()
    }
}
