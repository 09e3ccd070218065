// Catalog persistence (SQLite via sqlx).

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{info, instrument};

use super::CatalogStore;
use crate::domain::PokemonRecord;
use crate::error::StoreError;

#[derive(Debug, sqlx::FromRow)]
struct PokemonRow {
    id: i64,
    name_en: String,
    name_zh: String,
    image_url: String,
    type1: String,
    type2: Option<String>,
}

impl TryFrom<PokemonRow> for PokemonRecord {
    type Error = StoreError;

    fn try_from(row: PokemonRow) -> Result<Self, Self::Error> {
        let id = u32::try_from(row.id)
            .map_err(|_| StoreError::InvalidRecord(format!("id out of range: {}", row.id)))?;
        Ok(PokemonRecord {
            id,
            name_en: row.name_en,
            name_zh: row.name_zh,
            image_url: row.image_url,
            type1: row.type1,
            type2: row.type2,
        })
    }
}

const SELECT_COLUMNS: &str = "SELECT id, name_en, name_zh, image_url, type1, type2 FROM pokemons";

pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub async fn new(database_url: &str) -> Result<Self, StoreError> {
        // Every pooled connection to `:memory:` would open its own empty database.
        let in_memory = database_url.contains(":memory:");
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .idle_timeout(if in_memory { None } else { Some(Duration::from_secs(600)) })
            .max_lifetime(if in_memory { None } else { Some(Duration::from_secs(1800)) })
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.run_migrations().await?;
        info!(target: "catalog", in_memory, "SQLite catalog ready");
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pokemons (
                id INTEGER PRIMARY KEY,
                name_en TEXT NOT NULL,
                name_zh TEXT NOT NULL,
                image_url TEXT NOT NULL,
                type1 TEXT NOT NULL,
                type2 TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalog {
    async fn get(&self, id: u32) -> Result<Option<PokemonRecord>, StoreError> {
        let row = sqlx::query_as::<_, PokemonRow>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(i64::from(id))
            .fetch_optional(&self.pool)
            .await?;
        row.map(PokemonRecord::try_from).transpose()
    }

    async fn get_random(&self) -> Result<PokemonRecord, StoreError> {
        let row = sqlx::query_as::<_, PokemonRow>(&format!("{SELECT_COLUMNS} ORDER BY RANDOM() LIMIT 1"))
            .fetch_optional(&self.pool)
            .await?;
        row.ok_or(StoreError::Empty)?.try_into()
    }

    #[instrument(level = "debug", skip_all, fields(n = records.len()))]
    async fn save_all(&self, records: Vec<PokemonRecord>) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for r in &records {
            sqlx::query(
                "INSERT OR REPLACE INTO pokemons (id, name_en, name_zh, image_url, type1, type2) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(i64::from(r.id))
            .bind(r.name_en.as_str())
            .bind(r.name_zh.as_str())
            .bind(r.image_url.as_str())
            .bind(r.type1.as_str())
            .bind(r.type2.as_deref())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pokemons")
            .fetch_one(&self.pool)
            .await?;
        Ok(n.max(0) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{bulbasaur, pikachu};

    async fn test_store() -> SqliteCatalog {
        SqliteCatalog::new("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn starts_empty() {
        let store = test_store().await;
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.get(1).await.unwrap().is_none());
        assert!(matches!(store.get_random().await, Err(StoreError::Empty)));
    }

    #[tokio::test]
    async fn save_and_fetch_round_trip() {
        let store = test_store().await;
        store.save_all(vec![bulbasaur(), pikachu()]).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 2);
        assert_eq!(store.get(1).await.unwrap(), Some(bulbasaur()));
        let p = store.get(25).await.unwrap().unwrap();
        assert_eq!(p, pikachu());
        assert!(p.type2.is_none());
    }

    #[tokio::test]
    async fn random_returns_a_stored_record() {
        let store = test_store().await;
        store.save(pikachu()).await.unwrap();
        assert_eq!(store.get_random().await.unwrap(), pikachu());
    }

    #[tokio::test]
    async fn save_replaces_existing_id() {
        let store = test_store().await;
        store.save(pikachu()).await.unwrap();
        let mut p = pikachu();
        p.type2 = Some("Fairy".into());
        store.save(p).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.get(25).await.unwrap().unwrap().type2.as_deref(), Some("Fairy"));
    }

    #[tokio::test]
    async fn creates_missing_database_file() {
        let file = std::env::temp_dir().join(format!("pokeguess-catalog-{}.db", std::process::id()));
        let _ = std::fs::remove_file(&file);

        let url = format!("sqlite://{}", file.display());
        let store = SqliteCatalog::new(&url).await.unwrap();
        store.save(bulbasaur()).await.unwrap();
        assert!(file.exists());
        assert_eq!(store.get(1).await.unwrap(), Some(bulbasaur()));

        drop(store);
        let _ = std::fs::remove_file(&file);
    }
}
