use serde::Serialize;

#[derive(Clone, PartialEq, Default, Debug, Serialize)]
pub struct Measurement {
    pub value: f64,
    pub text: String,
}

#[derive(Clone, PartialEq, Default, Debug, Serialize)]
pub struct Geometry {
    pub coordinates: Vec<[f64; 2]>, // [longitude, latitude]
}

#[derive(Clone, PartialEq, Default, Debug, Serialize)]
pub struct RouteResult {
    pub distance: Measurement, // In meters
    pub duration: Measurement, // In seconds
    pub geometry: Geometry,
}

#[derive(Clone, PartialEq, Debug)]
pub enum RouteSource {
    Remote,
    Fallback { reason: String },
}

#[derive(Clone, PartialEq, Debug)]
pub struct RouteOutcome {
    pub route: RouteResult,
    pub source: RouteSource,
}

impl RouteOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, RouteSource::Fallback { .. })
    }
}
