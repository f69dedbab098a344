use crate::domain::GeoPoint;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// A single accepted position sample. Immutable once created.
#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
    timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    altitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speed: Option<f64>,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Self {
        Coordinate {
            latitude,
            longitude,
            timestamp,
            altitude: None,
            speed: None,
        }
    }

    pub fn at(point: GeoPoint, timestamp: DateTime<Utc>) -> Self {
        Coordinate::new(point.latitude, point.longitude, timestamp)
    }

    pub fn with_altitude(mut self, altitude: Option<f64>) -> Self {
        self.altitude = altitude;
        self
    }

    pub fn with_speed(mut self, speed: Option<f64>) -> Self {
        self.speed = speed;
        self
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn altitude(&self) -> Option<f64> {
        self.altitude
    }

    pub fn speed(&self) -> Option<f64> {
        self.speed
    }
}

/// A sample as delivered by a location source, before validation.
#[derive(Clone, Copy, PartialEq, Default, Debug)]
pub struct RawLocation {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
    pub speed: Option<f64>, // In meters per second
    pub accuracy: Option<f64>,
    pub heading: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl RawLocation {
    pub fn at(latitude: f64, longitude: f64) -> Self {
        RawLocation {
            latitude: Some(latitude),
            longitude: Some(longitude),
            ..RawLocation::default()
        }
    }

    pub fn speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// A raw sample with usable coordinates, kept as the session's current location.
#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub speed: Option<f64>,
    pub accuracy: Option<f64>,
    pub heading: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Position {
    pub fn to_coordinate(&self, fallback_timestamp: DateTime<Utc>) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude, self.timestamp.unwrap_or(fallback_timestamp))
            .with_altitude(self.altitude)
            .with_speed(self.speed)
    }
}

impl TryFrom<RawLocation> for Position {
    type Error = MalformedSample;

    fn try_from(raw: RawLocation) -> Result<Self, Self::Error> {
        let latitude = raw.latitude.ok_or(MalformedSample::MissingCoordinate("latitude"))?;
        let longitude = raw.longitude.ok_or(MalformedSample::MissingCoordinate("longitude"))?;

        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(MalformedSample::NotFinite { latitude, longitude });
        }

        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(MalformedSample::OutOfRange { latitude, longitude });
        }

        Ok(Position {
            latitude,
            longitude,
            altitude: raw.altitude.filter(|altitude| altitude.is_finite()),
            speed: raw.speed,
            accuracy: raw.accuracy,
            heading: raw.heading,
            timestamp: raw.timestamp,
        })
    }
}

#[derive(Error, PartialEq, Debug)]
pub enum MalformedSample {
    #[error("sample is missing its {0}")]
    MissingCoordinate(&'static str),
    #[error("sample has a non-finite coordinate ({latitude}, {longitude})")]
    NotFinite { latitude: f64, longitude: f64 },
    #[error("sample coordinate ({latitude}, {longitude}) is out of range")]
    OutOfRange { latitude: f64, longitude: f64 },
}
