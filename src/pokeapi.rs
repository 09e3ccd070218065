//! Minimal PokeAPI client for the two by-id lookups we need.
//!
//! `/pokemon/{id}` gives name, slotted types, height (dm) and weight (hg);
//! `/pokemon-species/{id}` gives localized names and the color classification.
//! Only the fields we read are modelled; everything else in the payload is ignored.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, instrument};

use crate::error::ReferenceError;

#[derive(Clone, Debug, Deserialize)]
pub struct NamedResource {
  pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TypeSlot {
  pub slot: u8,
  #[serde(rename = "type")]
  pub kind: NamedResource,
}

/// Core attributes from `/pokemon/{id}`.
#[derive(Clone, Debug, Deserialize)]
pub struct PokemonData {
  pub name: String,
  /// Decimeters.
  pub height: u32,
  /// Hectograms.
  pub weight: u32,
  #[serde(default)]
  pub types: Vec<TypeSlot>,
}

impl PokemonData {
  /// Type name in the given slot (1 = primary, 2 = secondary), regardless of list order.
  pub fn type_in_slot(&self, slot: u8) -> Option<&str> {
    self.types.iter().find(|t| t.slot == slot).map(|t| t.kind.name.as_str())
  }
}

#[derive(Clone, Debug, Deserialize)]
pub struct LocalizedName {
  pub name: String,
  pub language: NamedResource,
}

/// Species metadata from `/pokemon-species/{id}`.
#[derive(Clone, Debug, Deserialize)]
pub struct SpeciesData {
  #[serde(default)]
  pub names: Vec<LocalizedName>,
  #[serde(default)]
  pub color: Option<NamedResource>,
}

impl SpeciesData {
  pub fn localized_name(&self, language: &str) -> Option<&str> {
    self.names
      .iter()
      .find(|n| n.language.name == language)
      .map(|n| n.name.as_str())
  }
}

/// The public reference data service, consumed best-effort.
#[async_trait]
pub trait ReferenceData: Send + Sync {
  async fn pokemon(&self, id: u32) -> Result<PokemonData, ReferenceError>;
  async fn species(&self, id: u32) -> Result<SpeciesData, ReferenceError>;
}

#[derive(Clone)]
pub struct PokeApi {
  client: reqwest::Client,
  pub base_url: String,
}

impl PokeApi {
  pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ReferenceError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Self { client, base_url: base_url.into().trim_end_matches('/').to_string() })
  }

  #[instrument(level = "debug", skip(self))]
  async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ReferenceError> {
    let url = format!("{}/{}", self.base_url, path);
    let res = self.client.get(&url)
      .header(USER_AGENT, "pokeguess-backend/0.1")
      .send().await?;

    if !res.status().is_success() {
      return Err(ReferenceError::Status { status: res.status().as_u16(), url });
    }

    let body = res.bytes().await?;
    debug!(target: "pokeguess", %url, bytes = body.len(), "Reference response received");
    serde_json::from_slice::<T>(&body).map_err(|e| ReferenceError::Malformed(format!("{url}: {e}")))
  }
}

#[async_trait]
impl ReferenceData for PokeApi {
  async fn pokemon(&self, id: u32) -> Result<PokemonData, ReferenceError> {
    self.get_json(&format!("pokemon/{id}")).await
  }

  async fn species(&self, id: u32) -> Result<SpeciesData, ReferenceError> {
    self.get_json(&format!("pokemon-species/{id}")).await
  }
}
