//! One-time catalog population from the reference API.
//!
//! Each id is crawled independently (core data + species data). A failure for
//! one id is logged and counted, never fatal; the pass always runs to the end.

use std::time::Duration;

use tracing::{error, info, instrument, warn};

use super::CatalogStore;
use crate::config::PopulateSettings;
use crate::domain::{artwork_url, PokemonRecord, CATALOG_SIZE, UNKNOWN_ZH};
use crate::error::{ReferenceError, StoreError};
use crate::pokeapi::{PokemonData, ReferenceData, SpeciesData};
use crate::util::capitalize_name;

#[derive(Clone, Debug)]
pub struct PopulateOptions {
    pub max_id: u32,
    pub delay: Duration,
    pub language: String,
}

impl Default for PopulateOptions {
    fn default() -> Self {
        Self { max_id: CATALOG_SIZE, delay: Duration::from_millis(150), language: "zh-Hans".into() }
    }
}

impl From<&PopulateSettings> for PopulateOptions {
    fn from(s: &PopulateSettings) -> Self {
        Self { max_id: s.max_id, delay: s.delay, language: s.language.clone() }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PopulateReport {
    /// The store already had records; nothing was fetched.
    pub skipped: bool,
    pub succeeded: u32,
    pub failed: u32,
    /// Records in the store after the pass.
    pub total: usize,
}

/// Build a complete record from the two reference payloads.
/// Fails (instead of producing a partial record) when the primary type is missing.
pub fn build_record(
    id: u32,
    pokemon: &PokemonData,
    species: &SpeciesData,
    language: &str,
) -> Result<PokemonRecord, ReferenceError> {
    let type1 = pokemon
        .type_in_slot(1)
        .map(capitalize_name)
        .ok_or_else(|| ReferenceError::Malformed(format!("pokemon {id} has no slot-1 type")))?;
    let name_en = capitalize_name(pokemon.name.trim());
    if name_en.is_empty() {
        return Err(ReferenceError::Malformed(format!("pokemon {id} has an empty name")));
    }
    let name_zh = species
        .localized_name(language)
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(UNKNOWN_ZH)
        .to_string();

    Ok(PokemonRecord {
        id,
        name_en,
        name_zh,
        image_url: artwork_url(id),
        type1,
        type2: pokemon.type_in_slot(2).map(capitalize_name),
    })
}

#[derive(Debug, thiserror::Error)]
enum CrawlError {
    #[error(transparent)]
    Reference(#[from] ReferenceError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

async fn crawl_one(
    store: &dyn CatalogStore,
    reference: &dyn ReferenceData,
    id: u32,
    language: &str,
) -> Result<(), CrawlError> {
    let pokemon = reference.pokemon(id).await?;
    let species = reference.species(id).await?;
    let record = build_record(id, &pokemon, &species, language)?;
    store.save(record).await?;
    Ok(())
}

/// Fill an empty catalog with ids `1..=max_id`. No-op when the store has records.
#[instrument(level = "info", skip_all, fields(max_id = options.max_id))]
pub async fn populate(
    store: &dyn CatalogStore,
    reference: &dyn ReferenceData,
    options: &PopulateOptions,
) -> Result<PopulateReport, StoreError> {
    let existing = store.count().await?;
    if existing > 0 {
        info!(target: "catalog", existing, "Catalog already initialized; skipping population");
        return Ok(PopulateReport { skipped: true, total: existing, ..Default::default() });
    }

    info!(target: "catalog", "Initializing catalog from reference API");
    let mut report = PopulateReport::default();

    for id in 1..=options.max_id {
        match crawl_one(store, reference, id, &options.language).await {
            Ok(()) => report.succeeded += 1,
            Err(e) => {
                report.failed += 1;
                warn!(target: "catalog", id, error = %e, "Failed to load species; skipping");
            }
        }

        if id % 10 == 0 {
            info!(
                target: "catalog",
                progress = %format!("{}/{}", id, options.max_id),
                succeeded = report.succeeded,
                failed = report.failed,
                "Population progress"
            );
        }

        if !options.delay.is_zero() && id < options.max_id {
            tokio::time::sleep(options.delay).await;
        }
    }

    report.total = store.count().await?;
    if report.succeeded == 0 && options.max_id > 0 {
        error!(target: "catalog", failed = report.failed, "Population loaded nothing; catalog is empty");
    } else {
        info!(
            target: "catalog",
            total = report.total,
            succeeded = report.succeeded,
            failed = report.failed,
            "Catalog initialization complete"
        );
    }
    Ok(report)
}
