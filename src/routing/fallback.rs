use crate::distance::haversine;
use crate::domain::{Coordinate, Geometry, Measurement, Place, RouteResult};

pub const DEFAULT_WALKING_SPEED_KMH: f64 = 5.0;

/// Straight-line estimate between origin and destination at a constant walking speed.
pub fn straight_line_route(origin: &Coordinate, destination: &Coordinate, walking_speed_kmh: f64) -> RouteResult {
    let kilometers = haversine(origin, destination);
    let meters = kilometers * 1000.0;
    let seconds = if walking_speed_kmh > 0.0 { kilometers / walking_speed_kmh * 3600.0 } else { 0.0 };

    RouteResult {
        distance: Measurement {
            value: meters,
            text: format_distance(meters),
        },
        duration: Measurement {
            value: seconds,
            text: format_duration(seconds),
        },
        geometry: Geometry {
            coordinates: vec![[origin.longitude(), origin.latitude()], [destination.longitude(), destination.latitude()]],
        },
    }
}

pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{} m", meters.round() as u64)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

pub fn format_duration(seconds: f64) -> String {
    let minutes = (seconds / 60.0).round() as u64;
    match (minutes / 60, minutes % 60) {
        (0, minutes) => format!("{} min", minutes),
        (hours, 0) => format!("{} h", hours),
        (hours, minutes) => format!("{} h {} min", hours, minutes),
    }
}

/// Places offered while the geocoding API is unreachable.
pub fn places_matching(query: &str) -> Vec<Place> {
    let query = query.to_lowercase();
    known_places()
        .into_iter()
        .filter(|place| place.formatted_address.to_lowercase().contains(&query))
        .collect()
}

fn known_places() -> Vec<Place> {
    [
        (40.7128, -74.0060, "New York", "NY", "US"),
        (34.0522, -118.2437, "Los Angeles", "CA", "US"),
        (41.8781, -87.6298, "Chicago", "IL", "US"),
        (51.5074, -0.1278, "London", "England", "GB"),
        (48.8566, 2.3522, "Paris", "Île-de-France", "FR"),
        (52.3676, 4.9041, "Amsterdam", "North Holland", "NL"),
    ]
    .into_iter()
    .map(|(latitude, longitude, city, state, country)| Place {
        latitude,
        longitude,
        formatted_address: format!("{}, {}, {}", city, state, country),
        name: Some(city.to_string()),
        city: Some(city.to_string()),
        state: Some(state.to_string()),
        country: Some(country.to_string()),
    })
    .collect()
}
