use std::collections::HashMap;

use async_trait::async_trait;
use rand::seq::IteratorRandom;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::CatalogStore;
use crate::domain::PokemonRecord;
use crate::error::StoreError;

/// In-process catalog. Used when no DATABASE_URL is configured, and in tests.
#[derive(Default)]
pub struct MemoryCatalog {
    by_id: RwLock<HashMap<u32, PokemonRecord>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_records(records: impl IntoIterator<Item = PokemonRecord>) -> Self {
        let map = records.into_iter().map(|r| (r.id, r)).collect();
        Self { by_id: RwLock::new(map) }
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn get(&self, id: u32) -> Result<Option<PokemonRecord>, StoreError> {
        Ok(self.by_id.read().await.get(&id).cloned())
    }

    async fn get_random(&self) -> Result<PokemonRecord, StoreError> {
        let by_id = self.by_id.read().await;
        let picked = {
            let mut rng = rand::thread_rng();
            by_id.values().choose(&mut rng).cloned()
        };
        picked.ok_or(StoreError::Empty)
    }

    #[instrument(level = "debug", skip_all, fields(n = records.len()))]
    async fn save_all(&self, records: Vec<PokemonRecord>) -> Result<(), StoreError> {
        let mut by_id = self.by_id.write().await;
        for r in records {
            debug!(target: "catalog", id = r.id, name = %r.name_en, "Storing record");
            by_id.insert(r.id, r);
        }
        Ok(())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.by_id.read().await.len())
    }
}
