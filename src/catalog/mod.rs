//! Species catalog: the only durable state of the service.
//!
//! `CatalogStore` is the repository seam; `MemoryCatalog` keeps everything in a
//! map behind a `RwLock`, `SqliteCatalog` persists to a single `pokemons` table.
//! `populate` fills an empty store from the reference API once at startup.

use async_trait::async_trait;

use crate::domain::PokemonRecord;
use crate::error::StoreError;

pub mod memory;
pub mod populate;
pub mod sqlite;

pub use memory::MemoryCatalog;
pub use populate::{populate, PopulateOptions, PopulateReport};
pub use sqlite::SqliteCatalog;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get(&self, id: u32) -> Result<Option<PokemonRecord>, StoreError>;

    /// Uniform pick among all stored records; `StoreError::Empty` when there are none.
    async fn get_random(&self) -> Result<PokemonRecord, StoreError>;

    /// Insert (or replace) records atomically: either all become visible or none.
    async fn save_all(&self, records: Vec<PokemonRecord>) -> Result<(), StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;

    async fn save(&self, record: PokemonRecord) -> Result<(), StoreError> {
        self.save_all(vec![record]).await
    }
}
