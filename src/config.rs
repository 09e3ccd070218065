//! Runtime configuration: environment variables plus optional prompt overrides from TOML.
//!
//! See `AppConfig::from_lookup` for the full list of variables and `Prompts`
//! for the templates that can be overridden via PROMPTS_CONFIG_PATH.

use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::CATALOG_SIZE;
use crate::error::ConfigError;

#[derive(Clone, Debug)]
pub struct AppConfig {
  pub port: u16,
  /// SQLite connection string; `None` keeps the catalog in memory.
  pub database_url: Option<String>,
  pub pokeapi_base_url: String,
  pub http_timeout: Duration,
  pub populate: PopulateSettings,
  pub ollama: OllamaSettings,
  pub answer_cache_limit: usize,
  /// Empty means any origin.
  pub cors_origins: Vec<String>,
  pub prompts: Prompts,
}

#[derive(Clone, Debug)]
pub struct PopulateSettings {
  pub enabled: bool,
  pub max_id: u32,
  pub delay: Duration,
  /// Language tag used to pick the localized name, e.g. "zh-Hans".
  pub language: String,
}

#[derive(Clone, Debug)]
pub struct OllamaSettings {
  pub url: String,
  pub model: String,
  pub enabled: bool,
  pub timeout: Duration,
}

impl AppConfig {
  /// Read configuration from the process environment.
  pub fn from_env() -> Result<Self, ConfigError> {
    let mut cfg = Self::from_lookup(|k| std::env::var(k).ok())?;
    if let Some(file) = load_prompt_config_from_env() {
      cfg.prompts = file.prompts;
    }
    Ok(cfg)
  }

  /// Build configuration from an arbitrary key lookup (env in production, maps in tests).
  ///
  /// Variables:
  ///   PORT                 : u16 (default 8888)
  ///   DATABASE_URL         : SQLite URL; unset keeps the catalog in memory
  ///   POKEAPI_BASE_URL     : default "https://pokeapi.co/api/v2"
  ///   HTTP_TIMEOUT_SECS    : reference API timeout (default 10)
  ///   DATA_INIT_ENABLED    : crawl the catalog at startup (default true)
  ///   DATA_INIT_DELAY_MS   : pause between crawled ids (default 150)
  ///   DATA_INIT_MAX_ID     : last id to crawl (default 151)
  ///   DATA_INIT_LANGUAGE   : localized name language tag (default "zh-Hans")
  ///   OLLAMA_URL           : default "http://localhost:11434"
  ///   OLLAMA_MODEL         : default "gemma2:9b"
  ///   OLLAMA_ENABLED       : default true
  ///   OLLAMA_TIMEOUT_SECS  : default 60
  ///   ANSWER_CACHE_LIMIT   : Q&A cache flush threshold (default 1000)
  ///   CORS_ALLOWED_ORIGINS : comma-separated origins; unset allows any
  pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |k: &str| get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let port = parse_or(&get, "PORT", 8888u16)?;
    let http_timeout = Duration::from_secs(parse_or(&get, "HTTP_TIMEOUT_SECS", 10u64)?);

    let populate = PopulateSettings {
      enabled: parse_bool_or(&get, "DATA_INIT_ENABLED", true)?,
      max_id: parse_or(&get, "DATA_INIT_MAX_ID", CATALOG_SIZE)?,
      delay: Duration::from_millis(parse_or(&get, "DATA_INIT_DELAY_MS", 150u64)?),
      language: get("DATA_INIT_LANGUAGE").unwrap_or_else(|| "zh-Hans".into()),
    };

    let ollama = OllamaSettings {
      url: get("OLLAMA_URL")
        .unwrap_or_else(|| "http://localhost:11434".into())
        .trim_end_matches('/')
        .to_string(),
      model: get("OLLAMA_MODEL").unwrap_or_else(|| "gemma2:9b".into()),
      enabled: parse_bool_or(&get, "OLLAMA_ENABLED", true)?,
      timeout: Duration::from_secs(parse_or(&get, "OLLAMA_TIMEOUT_SECS", 60u64)?),
    };

    let cors_origins = get("CORS_ALLOWED_ORIGINS")
      .map(|v| {
        v.split(',')
          .map(|o| o.trim().trim_end_matches('/').to_string())
          .filter(|o| !o.is_empty())
          .collect()
      })
      .unwrap_or_default();

    Ok(Self {
      port,
      database_url: get("DATABASE_URL"),
      pokeapi_base_url: get("POKEAPI_BASE_URL")
        .unwrap_or_else(|| "https://pokeapi.co/api/v2".into())
        .trim_end_matches('/')
        .to_string(),
      http_timeout,
      populate,
      ollama,
      answer_cache_limit: parse_or(&get, "ANSWER_CACHE_LIMIT", 1000usize)?,
      cors_origins,
      prompts: Prompts::default(),
    })
  }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
  T: std::str::FromStr,
  G: Fn(&str) -> Option<String>,
{
  match get(key) {
    Some(v) => v.parse::<T>().map_err(|_| ConfigError::Invalid { key, value: v }),
    None => Ok(default),
  }
}

fn parse_bool_or<G>(get: &G, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
  G: Fn(&str) -> Option<String>,
{
  match get(key) {
    Some(v) => match v.to_ascii_lowercase().as_str() {
      "1" | "true" | "yes" | "on" => Ok(true),
      "0" | "false" | "no" | "off" => Ok(false),
      _ => Err(ConfigError::Invalid { key, value: v }),
    },
    None => Ok(default),
  }
}

/// Optional TOML file with prompt overrides.
#[derive(Clone, Debug, Deserialize, Default)]
pub struct PromptConfig {
  #[serde(default)]
  pub prompts: Prompts,
}

/// Prompt templates sent to the generation gateway. `{placeholder}`s are
/// substituted with `fill_template`. Any subset can be overridden in TOML.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  /// Placeholders: {question}
  pub ask_template: String,
  /// Placeholders: {name}
  pub detail_template: String,
  /// Placeholders: {attacker}, {defender}
  pub battle_template: String,
  /// Placeholders: {name}, {setting}
  pub story_template: String,
  /// Placeholders: {name_en}
  pub hint_en_template: String,
  /// Placeholders: {name_en}, {name_zh}
  pub hint_zh_template: String,
  pub hint_en_fallback: String,
  pub hint_zh_fallback: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      ask_template: "You are an expert on the Pokémon franchise and its Pokédex. Answer in English.\n\n\
        Requirements:\n\
        1. Stick to accurate, official information.\n\
        2. Add background stories and ecology where they are relevant.\n\
        3. Mention related legends or fun facts if there are any.\n\
        4. Keep the tone lively and friendly for players.\n\
        5. Finish every sentence; never stop mid-answer.\n\n\
        Question: {question}\n\n\
        Answer:".into(),
      detail_template: "Give a detailed introduction of the Pokémon {name}.\n\n\
        Cover these sections, each with a header:\n\
        1. Attributes: type, height, weight, abilities\n\
        2. Evolution: the full evolution line and how each stage evolves\n\
        3. Signature moves: 3-5 common moves and what they do\n\
        4. Battle role: how it is used in battle and typical tactics\n\
        5. Lore: Pokédex entries and habitat\n\
        6. Trivia: little-known facts\n\n\
        Write in clear English that a new player can follow.".into(),
      battle_template: "Analyse the Pokémon battle {attacker} vs {defender}.\n\n\
        Cover:\n\
        1. Type matchup: who has the advantage and why\n\
        2. Moves: which moves {attacker} should use\n\
        3. Tactics: a concrete battle plan\n\
        4. Threats: what to watch out for from {defender}\n\n\
        Answer in English using bullet points.".into(),
      story_template: "Write an adventure story starring {name}.\n\n\
        Setting: {setting}\n\n\
        Constraints:\n\
        1. At least 3 other Pokémon appear as characters.\n\
        2. There is a clear conflict and a resolution.\n\
        3. {name}'s traits and abilities drive the plot.\n\
        4. The tone is vivid and suitable for all ages.\n\
        5. The story is at least 2500 characters long (roughly 500-800 words).\n\n\
        Begin the story:".into(),
      hint_en_template: "You are writing a clue for a Pokémon guessing game. The answer is {name_en}.\n\n\
        The clue must:\n\
        1. NEVER state the Pokémon's name.\n\
        2. Describe its appearance, behaviour or habitat.\n\
        3. Optionally mention what it is famous for or a well-known move.\n\
        4. Be 1-2 sentences long.\n\
        5. Help the player without giving it away.\n\n\
        Examples:\n\
        - \"This electric mouse stores lightning in its red cheeks.\"\n\
        - \"A little turtle that hides in its shell and sprays water from its mouth.\"\n\n\
        Write the clue for {name_en} without saying the name:".into(),
      hint_zh_template: "你在为宝可梦猜谜游戏写一条提示。答案是 {name_en}（{name_zh}）。\n\n\
        要求：\n\
        1. 绝对不能说出宝可梦的名字\n\
        2. 描述它的外形、习性或栖息地\n\
        3. 可以提到它出名的特点或招式\n\
        4. 只写1-2句话\n\
        5. 有帮助，但不要太明显\n\n\
        示例：\n\
        - “这只电气鼠把电储存在红红的脸颊里。”\n\
        - “一只躲进壳里、会从嘴里喷水的小乌龟。”\n\n\
        请用中文写出关于 {name_zh} 的提示（不要说出名字）：".into(),
      hint_en_fallback: "This Pokémon has unique characteristics that make it special!".into(),
      hint_zh_fallback: "这只宝可梦有着独特的特征，让它与众不同！".into(),
    }
  }
}

/// Attempt to load `PromptConfig` from PROMPTS_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_prompt_config_from_env() -> Option<PromptConfig> {
  let path = std::env::var("PROMPTS_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<PromptConfig>(&s) {
      Ok(cfg) => {
        info!(target: "pokeguess", %path, "Loaded prompt config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "pokeguess", %path, error = %e, "Failed to parse TOML prompt config");
        None
      }
    },
    Err(e) => {
      error!(target: "pokeguess", %path, error = %e, "Failed to read TOML prompt config file");
      None
    }
  }
}
