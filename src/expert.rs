//! AI expert features: free-form Q&A with a flush-on-overflow cache, detail /
//! battle / story prompts routed through the same cache, and per-species clues.
//!
//! The generation gateway is best-effort. Every failure is converted into a
//! fixed fallback text here; callers never see a generation error.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::catalog::CatalogStore;
use crate::config::Prompts;
use crate::domain::HintLanguage;
use crate::error::{GenerationError, StoreError};
use crate::ollama::{GenerateOptions, TextGenerator};
use crate::util::{fill_template, normalize_question, trunc_for_log};

pub const DEFAULT_ANSWER_CACHE_LIMIT: usize = 1000;

pub const UNAVAILABLE: &str = "AI service temporarily unavailable.";
pub const UNAVAILABLE_TRY_BASIC: &str = "AI service temporarily unavailable. Please try the basic hints!";

const ASK_OPTIONS: GenerateOptions = GenerateOptions::new(0.7, 0.9, 2000);
const HINT_OPTIONS: GenerateOptions = GenerateOptions::new(0.7, 0.9, 150);

/// Question -> answer cache. Once it holds more than `limit` entries the next
/// insert clears it completely first. Not an LRU.
pub struct AnswerCache {
    entries: RwLock<HashMap<String, String>>,
    limit: usize,
}

impl AnswerCache {
    pub fn new(limit: usize) -> Self {
        Self { entries: RwLock::new(HashMap::new()), limit }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn insert(&self, key: String, value: String) {
        let mut entries = self.entries.write().await;
        if entries.len() > self.limit {
            info!(target: "expert", size = entries.len(), limit = self.limit, "Answer cache over limit; flushing");
            entries.clear();
        }
        entries.insert(key, value);
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns how many entries were dropped.
    pub async fn clear(&self) -> usize {
        let mut entries = self.entries.write().await;
        let n = entries.len();
        entries.clear();
        n
    }
}

pub struct ExpertService {
    catalog: Arc<dyn CatalogStore>,
    generator: Arc<dyn TextGenerator>,
    cache: AnswerCache,
    prompts: Prompts,
}

impl ExpertService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        generator: Arc<dyn TextGenerator>,
        prompts: Prompts,
        cache_limit: usize,
    ) -> Self {
        Self { catalog, generator, cache: AnswerCache::new(cache_limit), prompts }
    }

    /// Probe first; an unavailable gateway short-circuits without a generate call.
    async fn generate(&self, prompt: &str, options: GenerateOptions) -> Result<String, GenerationError> {
        if !self.generator.is_available().await {
            return Err(GenerationError::Unavailable(format!("{} probe failed", self.generator.model())));
        }
        self.generator.generate(prompt, options).await
    }

    #[instrument(level = "info", skip(self, question), fields(question_len = question.len()))]
    pub async fn ask(&self, question: &str) -> String {
        let key = normalize_question(question);
        if let Some(hit) = self.cache.get(&key).await {
            debug!(target: "expert", "Answer cache hit");
            return hit;
        }

        let prompt = fill_template(&self.prompts.ask_template, &[("question", question)]);
        let answer = match self.generate(&prompt, ASK_OPTIONS).await {
            Ok(text) => {
                debug!(target: "expert", answer = %trunc_for_log(&text, 60), "Generated answer");
                text
            }
            Err(e) => {
                warn!(target: "expert", error = %e, "Generation failed; answering with fallback text");
                fallback_text(&e).to_string()
            }
        };

        self.cache.insert(key, answer.clone()).await;
        answer
    }

    pub async fn detail(&self, pokemon_name: &str) -> String {
        let prompt = fill_template(&self.prompts.detail_template, &[("name", pokemon_name.trim())]);
        self.ask(&prompt).await
    }

    pub async fn battle_advice(&self, attacker: &str, defender: &str) -> String {
        let prompt = fill_template(
            &self.prompts.battle_template,
            &[("attacker", attacker.trim()), ("defender", defender.trim())],
        );
        self.ask(&prompt).await
    }

    pub async fn story(&self, pokemon_name: &str, setting: &str) -> String {
        let prompt = fill_template(
            &self.prompts.story_template,
            &[("name", pokemon_name.trim()), ("setting", setting.trim())],
        );
        self.ask(&prompt).await
    }

    /// Indirect 1-2 sentence clue for a species. `None` if the id is not in the catalog.
    #[instrument(level = "info", skip(self, language), fields(lang = language.as_str()))]
    pub async fn ai_hint(&self, id: u32, language: HintLanguage) -> Result<Option<String>, StoreError> {
        let Some(p) = self.catalog.get(id).await? else {
            return Ok(None);
        };

        let (template, fallback) = match language {
            HintLanguage::En => (&self.prompts.hint_en_template, &self.prompts.hint_en_fallback),
            HintLanguage::Zh => (&self.prompts.hint_zh_template, &self.prompts.hint_zh_fallback),
        };
        let prompt = fill_template(template, &[("name_en", p.name_en.as_str()), ("name_zh", p.name_zh.as_str())]);

        let hint = match self.generate(&prompt, HINT_OPTIONS).await {
            Ok(text) => text,
            Err(e) => {
                warn!(target: "expert", id, error = %e, "AI hint failed; using fallback hint");
                fallback.clone()
            }
        };
        Ok(Some(hint))
    }

    pub async fn clear_cache(&self) -> usize {
        let n = self.cache.clear().await;
        info!(target: "expert", cleared = n, "Answer cache cleared");
        n
    }

    #[cfg(test)]
    pub async fn cached_answers(&self) -> usize {
        self.cache.len().await
    }

    pub async fn models(&self) -> Result<Vec<String>, GenerationError> {
        self.generator.list_models().await
    }

    /// Pull `name` onto the gateway, or the configured model when `None`.
    pub async fn pull_model(&self, name: Option<&str>) -> Result<String, GenerationError> {
        let name = name.unwrap_or_else(|| self.generator.model()).to_string();
        info!(target: "expert", model = %name, "Pulling model");
        self.generator.pull_model(&name).await
    }
}

fn fallback_text(e: &GenerationError) -> &'static str {
    match e {
        GenerationError::Disabled | GenerationError::Unavailable(_) | GenerationError::EmptyResponse => UNAVAILABLE,
        GenerationError::Request(_) => UNAVAILABLE_TRY_BASIC,
    }
}
