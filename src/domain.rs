//! Domain models: catalog records, the answer-hiding challenge, enrichment and hints.

use serde::Serialize;

/// Number of species crawled into the catalog (generation I).
pub const CATALOG_SIZE: u32 = 151;

/// Sentinel for any attribute we could not resolve.
pub const UNKNOWN: &str = "Unknown";

/// Sentinel for a missing localized (Chinese) name.
pub const UNKNOWN_ZH: &str = "未知";

const ARTWORK_URL_TEMPLATE: &str =
  "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/official-artwork/{id}.png";

/// Official artwork URL for a species id. Deterministic, no network involved.
pub fn artwork_url(id: u32) -> String {
  ARTWORK_URL_TEMPLATE.replace("{id}", &id.to_string())
}

/// One species in the catalog. Either fully populated or absent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PokemonRecord {
  pub id: u32,
  pub name_en: String,
  pub name_zh: String,
  pub image_url: String,
  pub type1: String,
  pub type2: Option<String>,
}

impl PokemonRecord {
  /// "Grass/Poison" for dual types, "Electric" otherwise.
  pub fn type_label(&self) -> String {
    match self.type2.as_deref() {
      Some(t2) if !t2.is_empty() => format!("{}/{}", self.type1, t2),
      _ => self.type1.clone(),
    }
  }

  /// "Bulbasaur (妙蛙种子)"
  pub fn display_name(&self) -> String {
    format!("{} ({})", self.name_en, self.name_zh)
  }
}

/// What a quiz player gets to see. Deliberately has no name fields.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuizChallenge {
  pub id: u32,
  pub image_url: String,
}

impl From<&PokemonRecord> for QuizChallenge {
  fn from(p: &PokemonRecord) -> Self {
    Self { id: p.id, image_url: p.image_url.clone() }
  }
}

/// Display attributes fetched from the species endpoints and memoized per id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeciesEnrichment {
  pub height: String,
  pub weight: String,
  pub color: String,
}

impl SpeciesEnrichment {
  pub fn unknown() -> Self {
    Self { height: UNKNOWN.into(), weight: UNKNOWN.into(), color: UNKNOWN.into() }
  }
}

/// Basic (non-AI) hints for a species.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Hints {
  /// Combined type label; the field keeps the name the frontend expects.
  #[serde(rename = "type1")]
  pub type_label: String,
  pub height: String,
  pub weight: String,
  pub color: String,
}

/// Target language of AI hints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HintLanguage {
  #[default]
  En,
  Zh,
}

impl HintLanguage {
  /// "zh" selects Chinese, everything else (including absence) English.
  pub fn from_param(s: Option<&str>) -> Self {
    match s.map(str::trim) {
      Some(v) if v.eq_ignore_ascii_case("zh") => HintLanguage::Zh,
      _ => HintLanguage::En,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      HintLanguage::En => "en",
      HintLanguage::Zh => "zh",
    }
  }
}
