//! Public HTTP request/response structs (serde ready).
//! Request fields are optional so that missing values become a 400 with a
//! clear message; handlers map body rejections (bad JSON, wrong types) to 400 too.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub user_answer: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOut {
    pub correct: bool,
    pub correct_name: String,
}

#[derive(Debug, Deserialize)]
pub struct AiHintQuery {
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AiHintOut {
    pub hint: String,
}

#[derive(Debug, Deserialize)]
pub struct AskIn {
    #[serde(default)]
    pub question: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BattleQuery {
    #[serde(default)]
    pub attacker: Option<String>,
    #[serde(default)]
    pub defender: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StoryIn {
    #[serde(default)]
    pub pokemon: Option<String>,
    #[serde(default)]
    pub setting: Option<String>,
}

/// Shared response for every free-text AI endpoint.
#[derive(Debug, Serialize)]
pub struct AnswerOut {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct ModelsOut {
    pub models: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PullIn {
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PullOut {
    pub model: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct CacheClearedOut {
    pub cleared: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub status: &'static str,
    pub service: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub error: String,
}

/// `Some(trimmed)` for a present, non-blank value.
pub fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
