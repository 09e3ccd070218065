//! Quiz session logic: random challenges, answer checking, reveal and basic hints.
//! Stateless: every call is a lookup against the catalog and the enrichment cache.

use std::sync::Arc;

use tracing::{debug, error, instrument};

use crate::catalog::CatalogStore;
use crate::domain::{Hints, PokemonRecord, QuizChallenge, UNKNOWN};
use crate::enrichment::EnrichmentCache;
use crate::error::StoreError;

/// True when the trimmed submission matches either name, ignoring case.
/// No other normalization (no diacritic folding, no synonyms).
pub fn answer_matches(p: &PokemonRecord, submitted: &str) -> bool {
  let guess = submitted.trim().to_lowercase();
  if guess.is_empty() {
    return false;
  }
  guess == p.name_en.to_lowercase() || guess == p.name_zh.to_lowercase()
}

pub struct QuizService {
  catalog: Arc<dyn CatalogStore>,
  enrichment: Arc<EnrichmentCache>,
}

impl QuizService {
  pub fn new(catalog: Arc<dyn CatalogStore>, enrichment: Arc<EnrichmentCache>) -> Self {
    Self { catalog, enrichment }
  }

  #[instrument(level = "info", skip(self))]
  pub async fn new_challenge(&self) -> Result<QuizChallenge, StoreError> {
    let p = self.catalog.get_random().await?;
    debug!(target: "quiz", id = p.id, "Challenge picked");
    Ok(QuizChallenge::from(&p))
  }

  /// Fails closed: unknown ids and store errors are simply "not correct".
  #[instrument(level = "info", skip(self, submitted), fields(answer_len = submitted.len()))]
  pub async fn check_answer(&self, id: u32, submitted: &str) -> bool {
    match self.catalog.get(id).await {
      Ok(Some(p)) => answer_matches(&p, submitted),
      Ok(None) => false,
      Err(e) => {
        error!(target: "quiz", id, error = %e, "Catalog lookup failed while checking answer");
        false
      }
    }
  }

  /// "English (Chinese)", or "Unknown" when the id cannot be resolved.
  pub async fn reveal_name(&self, id: u32) -> String {
    match self.catalog.get(id).await {
      Ok(Some(p)) => p.display_name(),
      Ok(None) => UNKNOWN.to_string(),
      Err(e) => {
        error!(target: "quiz", id, error = %e, "Catalog lookup failed while revealing name");
        UNKNOWN.to_string()
      }
    }
  }

  #[instrument(level = "info", skip(self))]
  pub async fn get_hints(&self, id: u32) -> Result<Option<Hints>, StoreError> {
    let Some(p) = self.catalog.get(id).await? else {
      return Ok(None);
    };
    let extra = self.enrichment.get(id).await;
    Ok(Some(Hints {
      type_label: p.type_label(),
      height: extra.height,
      weight: extra.weight,
      color: extra.color,
    }))
  }
}
