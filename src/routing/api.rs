use crate::domain::{Coordinate, Geometry, Measurement, Place, RouteResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl From<&Coordinate> for LatLon {
    fn from(coordinate: &Coordinate) -> Self {
        LatLon {
            lat: coordinate.latitude(),
            lon: coordinate.longitude(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RouteRequest {
    pub origin: LatLon,
    pub destination: LatLon,
    pub modes: Vec<&'static str>,
    pub units: &'static str,
}

impl RouteRequest {
    pub fn walking(origin: &Coordinate, destination: &Coordinate) -> Self {
        RouteRequest {
            origin: origin.into(),
            destination: destination.into(),
            modes: vec!["foot"],
            units: "metric",
        }
    }
}

// Fields the routing API leaves out (or sends as null) default to zero or an empty string
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RouteResponse {
    pub routes: Vec<RouteGet>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RouteGet {
    pub distance: Option<MeasurementGet>,
    pub duration: Option<MeasurementGet>,
    pub geometry: Option<GeometryGet>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MeasurementGet {
    pub value: Option<f64>,
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GeometryGet {
    pub coordinates: Option<Vec<[f64; 2]>>,
}

impl From<MeasurementGet> for Measurement {
    fn from(measurement: MeasurementGet) -> Self {
        Measurement {
            value: measurement.value.unwrap_or_default(),
            text: measurement.text.unwrap_or_default(),
        }
    }
}

impl From<RouteGet> for RouteResult {
    fn from(route: RouteGet) -> Self {
        RouteResult {
            distance: route.distance.map(Measurement::from).unwrap_or_default(),
            duration: route.duration.map(Measurement::from).unwrap_or_default(),
            geometry: Geometry {
                coordinates: route.geometry.and_then(|geometry| geometry.coordinates).unwrap_or_default(),
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AutocompleteResponse {
    pub addresses: Vec<AddressGet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressGet {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub formatted_address: String,
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl From<AddressGet> for Place {
    fn from(address: AddressGet) -> Self {
        Place {
            latitude: address.latitude,
            longitude: address.longitude,
            formatted_address: address.formatted_address,
            name: address.name,
            city: address.city,
            state: address.state,
            country: address.country,
        }
    }
}
