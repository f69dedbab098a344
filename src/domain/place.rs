use serde::Serialize;

#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: String,
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

#[derive(Clone, PartialEq, Debug)]
pub enum SearchSource {
    Remote,
    Skipped,
    Fallback { reason: String },
}

#[derive(Clone, PartialEq, Debug)]
pub struct SearchOutcome {
    pub places: Vec<Place>,
    pub source: SearchSource,
}
