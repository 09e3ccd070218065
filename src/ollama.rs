//! Minimal Ollama client for our use-cases.
//!
//! We only call `/api/generate` (non-streaming) and `/api/tags` (availability probe
//! and model listing). Calls are instrumented and log model names, latencies and
//! response sizes (not contents).

use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::config::OllamaSettings;
use crate::error::GenerationError;

const CLIENT_UA: &str = "pokeguess-backend/0.1";
const REPEAT_PENALTY: f32 = 1.1;

/// Sampling parameters for one generation call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerateOptions {
  pub temperature: f32,
  pub top_p: f32,
  pub max_tokens: u32,
}

impl GenerateOptions {
  pub const fn new(temperature: f32, top_p: f32, max_tokens: u32) -> Self {
    Self { temperature, top_p, max_tokens }
  }
}

/// The text-generation gateway: prompt in, text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
  /// Model used for generation (for logs).
  fn model(&self) -> &str;

  /// Cheap probe; `false` means generation should not be attempted.
  async fn is_available(&self) -> bool;

  async fn generate(&self, prompt: &str, options: GenerateOptions) -> Result<String, GenerationError>;

  async fn list_models(&self) -> Result<Vec<String>, GenerationError>;

  /// Ask the gateway to download a model; returns the gateway's final status line.
  async fn pull_model(&self, name: &str) -> Result<String, GenerationError>;
}

#[derive(Clone)]
pub struct Ollama {
  client: reqwest::Client,
  pub base_url: String,
  pub model: String,
  pub enabled: bool,
}

impl Ollama {
  pub fn new(settings: &OllamaSettings) -> Result<Self, GenerationError> {
    let client = reqwest::Client::builder()
      .timeout(settings.timeout)
      .build()?;
    Ok(Self {
      client,
      base_url: settings.url.trim_end_matches('/').to_string(),
      model: settings.model.clone(),
      enabled: settings.enabled,
    })
  }

  fn get(&self, path: &str) -> reqwest::RequestBuilder {
    self.client.get(format!("{}{}", self.base_url, path))
      .header(USER_AGENT, CLIENT_UA)
      .header("ngrok-skip-browser-warning", "true")
  }

  async fn tags(&self) -> Result<TagsResponse, GenerationError> {
    let res = self.get("/api/tags").send().await?;
    if !res.status().is_success() {
      return Err(GenerationError::Unavailable(format!("HTTP {}", res.status())));
    }
    res.json::<TagsResponse>().await.map_err(GenerationError::from)
  }
}

#[async_trait]
impl TextGenerator for Ollama {
  fn model(&self) -> &str {
    &self.model
  }

  #[instrument(level = "debug", skip(self), fields(base_url = %self.base_url))]
  async fn is_available(&self) -> bool {
    if !self.enabled {
      return false;
    }
    match self.get("/api/tags").send().await {
      Ok(res) if res.status().is_success() => true,
      Ok(res) => {
        warn!(target: "pokeguess", status = %res.status(), "Ollama probe returned non-success status");
        false
      }
      Err(e) => {
        warn!(target: "pokeguess", error = %e, "Ollama not reachable");
        false
      }
    }
  }

  #[instrument(level = "info", skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len(), max_tokens = options.max_tokens))]
  async fn generate(&self, prompt: &str, options: GenerateOptions) -> Result<String, GenerationError> {
    if !self.enabled {
      return Err(GenerationError::Disabled);
    }

    let req = GenerateRequest {
      model: &self.model,
      prompt,
      stream: false,
      options: GenerateRequestOptions {
        temperature: options.temperature,
        top_p: options.top_p,
        num_predict: options.max_tokens,
        repeat_penalty: REPEAT_PENALTY,
      },
    };

    let start = Instant::now();
    let res = self.client.post(format!("{}/api/generate", self.base_url))
      .header(USER_AGENT, CLIENT_UA)
      .header(CONTENT_TYPE, "application/json")
      .header("ngrok-skip-browser-warning", "true")
      .json(&req).send().await?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_ollama_error(&body).unwrap_or(body);
      error!(target: "pokeguess", %status, elapsed = ?start.elapsed(), "Ollama generate failed");
      return Err(GenerationError::Request(format!("Ollama HTTP {}: {}", status, msg)));
    }

    let body: GenerateResponse = res.json().await?;
    let elapsed = start.elapsed();
    if let (Some(n), Some(d)) = (body.eval_count, body.eval_duration) {
      debug!(target: "pokeguess", eval_count = n, eval_ms = d / 1_000_000, "Ollama eval stats");
    }

    let text = body.response.unwrap_or_default().trim().to_string();
    if text.is_empty() {
      return Err(GenerationError::EmptyResponse);
    }
    info!(target: "pokeguess", ?elapsed, response_len = text.len(), "Ollama response received");
    Ok(text)
  }

  #[instrument(level = "debug", skip(self))]
  async fn list_models(&self) -> Result<Vec<String>, GenerationError> {
    if !self.enabled {
      return Err(GenerationError::Disabled);
    }
    let tags = self.tags().await?;
    Ok(tags.models.into_iter().map(|m| m.name).collect())
  }

  #[instrument(level = "info", skip(self))]
  async fn pull_model(&self, name: &str) -> Result<String, GenerationError> {
    if !self.enabled {
      return Err(GenerationError::Disabled);
    }

    let start = Instant::now();
    let res = self.client.post(format!("{}/api/pull", self.base_url))
      .header(USER_AGENT, CLIENT_UA)
      .header(CONTENT_TYPE, "application/json")
      .header("ngrok-skip-browser-warning", "true")
      .json(&PullRequest { name, stream: false })
      .send().await?;

    let status = res.status();
    let body = res.text().await?;
    if !status.is_success() {
      let msg = extract_ollama_error(&body).unwrap_or(body);
      error!(target: "pokeguess", %status, model = name, "Ollama pull failed");
      return Err(GenerationError::Request(format!("Ollama HTTP {}: {}", status, msg)));
    }

    let pulled = serde_json::from_str::<PullResponse>(&body)
      .map(|r| r.status)
      .unwrap_or(body);
    info!(target: "pokeguess", model = name, elapsed = ?start.elapsed(), status = %pulled, "Ollama pull finished");
    Ok(pulled)
  }
}

/// One-line summary of the gateway settings for startup logs.
pub fn describe(settings: &OllamaSettings) -> String {
  format!("{} (model {}, timeout {:?})", settings.url, settings.model, settings.timeout)
}

// --- Wire DTOs ---

#[derive(Serialize)]
struct GenerateRequest<'a> {
  model: &'a str,
  prompt: &'a str,
  stream: bool,
  options: GenerateRequestOptions,
}

#[derive(Serialize)]
struct GenerateRequestOptions {
  temperature: f32,
  top_p: f32,
  num_predict: u32,
  repeat_penalty: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
  #[serde(default)] response: Option<String>,
  #[serde(default)] eval_count: Option<u64>,
  #[serde(default)] eval_duration: Option<u64>,
}

#[derive(Deserialize)]
struct TagsResponse {
  #[serde(default)] models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag { name: String }

#[derive(Serialize)]
struct PullRequest<'a> {
  name: &'a str,
  stream: bool,
}

#[derive(Deserialize)]
struct PullResponse { status: String }

/// Try to extract a clean error message from an Ollama error body (`{"error": "..."}`).
fn extract_ollama_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EObj { error: String }
  serde_json::from_str::<EObj>(body).ok().map(|e| e.error)
}
