//! PokeGuess · Pokémon Quiz Backend
//!
//! - Axum HTTP API (served at the root and under /api/pokemon)
//! - Catalog of the 151 first-generation species, crawled from PokeAPI at startup
//! - Optional Ollama integration for hints, Q&A, battle advice and stories
//!
//! Important env variables:
//!   PORT                : u16 (default 8888)
//!   DATABASE_URL        : SQLite URL, e.g. "sqlite://pokeguess.db" (created if missing); unset keeps the catalog in memory
//!   DATA_INIT_ENABLED   : crawl PokeAPI when the catalog is empty (default true)
//!   OLLAMA_URL          : default "http://localhost:11434"
//!   OLLAMA_MODEL        : default "gemma2:9b"
//!   OLLAMA_ENABLED      : default true
//!   PROMPTS_CONFIG_PATH : path to TOML prompt overrides
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"
//!
//! See `config::AppConfig::from_lookup` for the rest.

mod telemetry;
mod util;
mod domain;
mod error;
mod config;
mod pokeapi;
mod ollama;
mod catalog;
mod enrichment;
mod quiz;
mod expert;
mod state;
mod protocol;
mod routes;
#[cfg(test)]
mod testing;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::catalog::PopulateOptions;
use crate::config::AppConfig;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
  telemetry::init_tracing();

  let config = AppConfig::from_env()?;

  // Build shared application state (catalog store, PokeAPI client, Ollama gateway).
  let state = Arc::new(AppState::from_config(&config).await?);

  // Crawl in the background so the server answers /health right away.
  if config.populate.enabled {
    let populating = state.clone();
    let options = PopulateOptions::from(&config.populate);
    tokio::spawn(async move {
      match populating.populate_catalog(&options).await {
        Ok(report) => info!(target: "catalog", ?report, "Catalog population finished"),
        Err(e) => error!(target: "catalog", error = %e, "Catalog population failed"),
      }
    });
  } else {
    info!(target: "catalog", "Catalog population disabled (DATA_INIT_ENABLED=false)");
  }

  if config.ollama.enabled {
    let probing = state.clone();
    tokio::spawn(async move { probing.check_model().await });
  }

  let app = build_router(state, &config.cors_origins);

  let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
  let listener = TcpListener::bind(addr).await?;
  info!(target: "pokeguess", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    error!(target: "pokeguess", error = %e, "Failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  info!(target: "pokeguess", "Shutdown signal received");
}
