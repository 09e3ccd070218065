//! Test doubles shared by the unit tests: sample records plus call-counting
//! stubs for the reference API and the generation gateway.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::{artwork_url, PokemonRecord};
use crate::error::{GenerationError, ReferenceError};
use crate::ollama::{GenerateOptions, TextGenerator};
use crate::pokeapi::{PokemonData, ReferenceData, SpeciesData};

pub fn bulbasaur() -> PokemonRecord {
    PokemonRecord {
        id: 1,
        name_en: "Bulbasaur".into(),
        name_zh: "妙蛙种子".into(),
        image_url: artwork_url(1),
        type1: "Grass".into(),
        type2: Some("Poison".into()),
    }
}

pub fn pikachu() -> PokemonRecord {
    PokemonRecord {
        id: 25,
        name_en: "Pikachu".into(),
        name_zh: "皮卡丘".into(),
        image_url: artwork_url(25),
        type1: "Electric".into(),
        type2: None,
    }
}

/// Reference API stub serving a synthetic generation I.
/// Bulbasaur (1) and Pikachu (25) carry their real data; every other id is a
/// plain Normal-type placeholder.
#[derive(Default)]
pub struct StubReference {
    unreachable: bool,
    failing_pokemon: HashSet<u32>,
    failing_species: HashSet<u32>,
    transient_failures: AtomicU32,
    pokemon_calls: AtomicU32,
    species_calls: AtomicU32,
}

impl StubReference {
    pub fn generation_one() -> Self {
        Self::default()
    }

    pub fn unreachable() -> Self {
        Self { unreachable: true, ..Self::default() }
    }

    pub fn failing_pokemon(mut self, ids: &[u32]) -> Self {
        self.failing_pokemon.extend(ids);
        self
    }

    pub fn failing_species(mut self, ids: &[u32]) -> Self {
        self.failing_species.extend(ids);
        self
    }

    /// The next `n` pokemon lookups fail, then the stub recovers.
    pub fn failing_first(self, n: u32) -> Self {
        self.transient_failures.store(n, Ordering::SeqCst);
        self
    }

    pub fn pokemon_calls(&self) -> u32 {
        self.pokemon_calls.load(Ordering::SeqCst)
    }

    pub fn species_calls(&self) -> u32 {
        self.species_calls.load(Ordering::SeqCst)
    }

    fn take_transient_failure(&self) -> bool {
        self.transient_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

fn outage(what: &str, id: u32) -> ReferenceError {
    ReferenceError::Malformed(format!("stubbed {what} failure for {id}"))
}

#[async_trait]
impl ReferenceData for StubReference {
    async fn pokemon(&self, id: u32) -> Result<PokemonData, ReferenceError> {
        self.pokemon_calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable || self.failing_pokemon.contains(&id) || self.take_transient_failure() {
            return Err(outage("pokemon", id));
        }
        let value = match id {
            1 => json!({
                "name": "bulbasaur", "height": 7, "weight": 69,
                "types": [
                    { "slot": 2, "type": { "name": "poison" } },
                    { "slot": 1, "type": { "name": "grass" } }
                ]
            }),
            25 => json!({
                "name": "pikachu", "height": 4, "weight": 60,
                "types": [ { "slot": 1, "type": { "name": "electric" } } ]
            }),
            _ => json!({
                "name": format!("species{id}"), "height": id, "weight": id * 10,
                "types": [ { "slot": 1, "type": { "name": "normal" } } ]
            }),
        };
        serde_json::from_value(value).map_err(|e| ReferenceError::Malformed(e.to_string()))
    }

    async fn species(&self, id: u32) -> Result<SpeciesData, ReferenceError> {
        self.species_calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable || self.failing_species.contains(&id) {
            return Err(outage("species", id));
        }
        let (zh, color) = match id {
            1 => ("妙蛙种子".to_string(), "green"),
            25 => ("皮卡丘".to_string(), "yellow"),
            _ => (format!("宝可梦{id}"), "brown"),
        };
        let value = json!({
            "color": { "name": color },
            "names": [
                { "name": "placeholder", "language": { "name": "ja" } },
                { "name": zh, "language": { "name": "zh-Hans" } }
            ]
        });
        serde_json::from_value(value).map_err(|e| ReferenceError::Malformed(e.to_string()))
    }
}

/// Generation gateway stub: records prompts and counts probes/calls.
pub struct StubGenerator {
    available: AtomicBool,
    failing: AtomicBool,
    response: String,
    probes: AtomicU32,
    calls: AtomicU32,
    prompts: Mutex<Vec<String>>,
    options: Mutex<Vec<GenerateOptions>>,
    pulled: Mutex<Vec<String>>,
}

impl StubGenerator {
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            failing: AtomicBool::new(false),
            response: "Stub answer".into(),
            probes: AtomicU32::new(0),
            calls: AtomicU32::new(0),
            prompts: Mutex::new(Vec::new()),
            options: Mutex::new(Vec::new()),
            pulled: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(mut self, text: impl Into<String>) -> Self {
        self.response = text.into();
        self
    }

    pub fn with_available(self, available: bool) -> Self {
        self.available.store(available, Ordering::SeqCst);
        self
    }

    /// Probe succeeds, but every generate call errors.
    pub fn failing(self) -> Self {
        self.failing.store(true, Ordering::SeqCst);
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn probes(&self) -> u32 {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }

    pub fn last_options(&self) -> Option<GenerateOptions> {
        self.options.lock().unwrap().last().copied()
    }

    pub fn last_pulled(&self) -> Option<String> {
        self.pulled.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    fn model(&self) -> &str {
        "stub-model"
    }

    async fn is_available(&self) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.available.load(Ordering::SeqCst)
    }

    async fn generate(&self, prompt: &str, options: GenerateOptions) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.options.lock().unwrap().push(options);
        if self.failing.load(Ordering::SeqCst) {
            return Err(GenerationError::Request("stubbed failure".into()));
        }
        Ok(self.response.clone())
    }

    async fn list_models(&self) -> Result<Vec<String>, GenerationError> {
        Ok(vec!["stub-model".into()])
    }

    async fn pull_model(&self, name: &str) -> Result<String, GenerationError> {
        self.pulled.lock().unwrap().push(name.to_string());
        if !self.available.load(Ordering::SeqCst) {
            return Err(GenerationError::Unavailable("stub gateway down".into()));
        }
        Ok("success".into())
    }
}
