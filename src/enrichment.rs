//! Species enrichment cache: id -> (height, weight, color).
//!
//! Successful lookups are memoized for the lifetime of the process (the key
//! space is the fixed catalog, so there is no eviction). Failed lookups return
//! the "Unknown" sentinel record and are NOT cached, so a later request retries.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use crate::domain::{SpeciesEnrichment, UNKNOWN};
use crate::error::ReferenceError;
use crate::pokeapi::{PokemonData, ReferenceData, SpeciesData};
use crate::util::capitalize;

pub struct EnrichmentCache {
    reference: Arc<dyn ReferenceData>,
    entries: RwLock<HashMap<u32, SpeciesEnrichment>>,
}

impl EnrichmentCache {
    pub fn new(reference: Arc<dyn ReferenceData>) -> Self {
        Self { reference, entries: RwLock::new(HashMap::new()) }
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn get(&self, id: u32) -> SpeciesEnrichment {
        if let Some(hit) = self.entries.read().await.get(&id).cloned() {
            debug!(target: "quiz", id, "Enrichment cache hit");
            return hit;
        }

        match self.fetch(id).await {
            Ok(enrichment) => {
                // Concurrent misses may both land here; the values are identical.
                self.entries.write().await.insert(id, enrichment.clone());
                enrichment
            }
            Err(e) => {
                warn!(target: "quiz", id, error = %e, "Species lookup failed; serving unknown attributes");
                SpeciesEnrichment::unknown()
            }
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    async fn fetch(&self, id: u32) -> Result<SpeciesEnrichment, ReferenceError> {
        let (pokemon, species) = tokio::join!(self.reference.pokemon(id), self.reference.species(id));
        Ok(to_enrichment(&pokemon?, &species?))
    }
}

/// Reference units are decimeters and hectograms.
fn to_enrichment(pokemon: &PokemonData, species: &SpeciesData) -> SpeciesEnrichment {
    SpeciesEnrichment {
        height: format!("{:.1} m", f64::from(pokemon.height) / 10.0),
        weight: format!("{:.1} kg", f64::from(pokemon.weight) / 10.0),
        color: species
            .color
            .as_ref()
            .map(|c| capitalize(&c.name))
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| UNKNOWN.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubReference;

    fn cache_with(reference: &Arc<StubReference>) -> EnrichmentCache {
        EnrichmentCache::new(reference.clone())
    }

    #[tokio::test]
    async fn converts_units_and_capitalizes_color() {
        let reference = Arc::new(StubReference::generation_one());
        let cache = cache_with(&reference);

        let e = cache.get(1).await;
        assert_eq!(
            e,
            SpeciesEnrichment { height: "0.7 m".into(), weight: "6.9 kg".into(), color: "Green".into() }
        );
    }

    #[tokio::test]
    async fn second_lookup_is_served_from_cache() {
        let reference = Arc::new(StubReference::generation_one());
        let cache = cache_with(&reference);

        let first = cache.get(25).await;
        let second = cache.get(25).await;

        assert_eq!(first, second);
        assert_eq!(first.height, "0.4 m");
        assert_eq!(first.weight, "6.0 kg");
        assert_eq!(reference.pokemon_calls(), 1);
        assert_eq!(reference.species_calls(), 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn failure_is_not_cached() {
        let reference = Arc::new(StubReference::generation_one().failing_first(1));
        let cache = cache_with(&reference);

        assert_eq!(cache.get(25).await, SpeciesEnrichment::unknown());
        assert_eq!(cache.len().await, 0);

        let recovered = cache.get(25).await;
        assert_eq!(recovered.color, "Yellow");
        assert_eq!(reference.pokemon_calls(), 2);

        assert_eq!(cache.get(25).await, recovered);
        assert_eq!(reference.pokemon_calls(), 2);
    }

    #[tokio::test]
    async fn species_failure_also_degrades() {
        let reference = Arc::new(StubReference::generation_one().failing_species(&[7]));
        let cache = cache_with(&reference);

        assert_eq!(cache.get(7).await, SpeciesEnrichment::unknown());
        assert_eq!(cache.len().await, 0);
    }

    #[test]
    fn missing_color_is_unknown() {
        let pokemon: PokemonData =
            serde_json::from_value(serde_json::json!({ "name": "x", "height": 15, "weight": 1000 })).unwrap();
        let species: SpeciesData = serde_json::from_value(serde_json::json!({})).unwrap();
        let e = to_enrichment(&pokemon, &species);
        assert_eq!(e.height, "1.5 m");
        assert_eq!(e.weight, "100.0 kg");
        assert_eq!(e.color, UNKNOWN);
    }

    #[tokio::test]
    async fn slow_reference_times_out_to_unknown() {
        use std::time::Duration;
        use wiremock::matchers::{method, path_regex};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        use crate::pokeapi::PokeApi;

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/pokemon(-species)?/25$"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "name": "pikachu", "height": 4, "weight": 60 }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let reference = PokeApi::new(server.uri(), Duration::from_millis(200)).unwrap();
        let cache = EnrichmentCache::new(Arc::new(reference));

        let start = std::time::Instant::now();
        assert_eq!(cache.get(25).await, SpeciesEnrichment::unknown());
        assert!(start.elapsed() < Duration::from_secs(2));
        assert_eq!(cache.len().await, 0);
    }
}
