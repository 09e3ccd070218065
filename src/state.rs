//! Application state: explicit wiring of catalog, collaborators and services.
//!
//! Components are built once, in dependency order, and shared by `Arc`:
//!   catalog store  <- reference client (population only)
//!   enrichment cache <- reference client (owned by the quiz service)
//!   quiz service   <- catalog + enrichment cache
//!   expert service <- catalog + generation gateway + prompts

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::catalog::{populate, CatalogStore, MemoryCatalog, PopulateOptions, PopulateReport, SqliteCatalog};
use crate::config::AppConfig;
use crate::enrichment::EnrichmentCache;
use crate::error::StoreError;
use crate::expert::ExpertService;
use crate::ollama::{self, Ollama, TextGenerator};
use crate::pokeapi::{PokeApi, ReferenceData};
use crate::quiz::QuizService;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub reference: Arc<dyn ReferenceData>,
    pub generator: Arc<dyn TextGenerator>,
    pub quiz: Arc<QuizService>,
    pub expert: Arc<ExpertService>,
}

impl AppState {
    /// Wire services on top of already-built collaborators.
    pub fn assemble(
        config: &AppConfig,
        catalog: Arc<dyn CatalogStore>,
        reference: Arc<dyn ReferenceData>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        let enrichment = Arc::new(EnrichmentCache::new(reference.clone()));
        let quiz = Arc::new(QuizService::new(catalog.clone(), enrichment));
        let expert = Arc::new(ExpertService::new(
            catalog.clone(),
            generator.clone(),
            config.prompts.clone(),
            config.answer_cache_limit,
        ));
        Self { catalog, reference, generator, quiz, expert }
    }

    /// Build real collaborators from configuration, then assemble.
    #[instrument(level = "info", skip_all)]
    pub async fn from_config(config: &AppConfig) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let catalog: Arc<dyn CatalogStore> = match &config.database_url {
            Some(url) => {
                info!(target: "pokeguess", "Using SQLite catalog");
                Arc::new(SqliteCatalog::new(url).await?)
            }
            None => {
                info!(target: "pokeguess", "DATABASE_URL not set; using in-memory catalog");
                Arc::new(MemoryCatalog::new())
            }
        };

        let reference = PokeApi::new(&config.pokeapi_base_url, config.http_timeout)?;
        info!(target: "pokeguess", base_url = %reference.base_url, timeout = ?config.http_timeout, "Reference API client ready");

        let generator = Ollama::new(&config.ollama)?;
        if generator.enabled {
            info!(target: "pokeguess", gateway = %ollama::describe(&config.ollama), "Ollama enabled.");
        } else {
            info!(target: "pokeguess", "Ollama disabled (OLLAMA_ENABLED=false). AI endpoints serve fallback text.");
        }

        Ok(Self::assemble(config, catalog, Arc::new(reference), Arc::new(generator)))
    }

    /// Crawl the reference API into an empty catalog.
    pub async fn populate_catalog(&self, options: &PopulateOptions) -> Result<PopulateReport, StoreError> {
        populate(self.catalog.as_ref(), self.reference.as_ref(), options).await
    }

    /// Warn early when the configured model is not installed on the gateway.
    pub async fn check_model(&self) {
        let model = self.generator.model().to_string();
        match self.generator.list_models().await {
            Ok(models) if models.iter().any(|m| m == &model) => {
                info!(target: "pokeguess", %model, "Generation model available");
            }
            Ok(models) => {
                warn!(target: "pokeguess", %model, installed = ?models, "Generation model not installed on gateway");
            }
            Err(e) => {
                warn!(target: "pokeguess", %model, error = %e, "Could not list gateway models");
            }
        }
    }
}
