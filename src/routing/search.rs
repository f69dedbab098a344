use crate::domain::{Place, SearchOutcome, SearchSource};
use crate::routing::RouteService;
use crate::routing::api::AutocompleteResponse;
use crate::routing::fallback::places_matching;
use tracing::{info, instrument, warn};

impl RouteService {
    /// Autocompletes a free-text location query. Falls back to a small fixed list of places if the geocoding API fails.
    #[instrument(skip(self))]
    pub async fn search_locations(&self, query: &str) -> SearchOutcome {
        let query = query.trim();
        if query.is_empty() {
            return SearchOutcome {
                places: Vec::new(),
                source: SearchSource::Skipped,
            };
        }

        info!("🔎 Searching locations...");
        match self.autocomplete(query).await {
            Ok(places) => {
                info!("🔎 Searching locations... OK, {} found", places.len());
                SearchOutcome {
                    places,
                    source: SearchSource::Remote,
                }
            }
            Err(e) => {
                warn!("🔎 Searching locations... failed, {}. Using known places", e);
                SearchOutcome {
                    places: places_matching(query),
                    source: SearchSource::Fallback { reason: e.to_string() },
                }
            }
        }
    }

    async fn autocomplete(&self, query: &str) -> Result<Vec<Place>, reqwest::Error> {
        let limit = self.config.routing().search_limit().to_string();
        let response = self
            .client
            .get(format!("{}/search/autocomplete", self.config.routing().url()))
            .query(&[("query", query), ("limit", limit.as_str())])
            .send()
            .await?
            .error_for_status()?;

        let autocomplete = response.json::<AutocompleteResponse>().await?;
        Ok(autocomplete.addresses.into_iter().map(Place::from).collect())
    }
}
