//! HTTP endpoint handlers. These are thin wrappers that validate input and
//! forward to the quiz / expert services. Each handler is instrumented.

use std::sync::Arc;
use axum::{
  extract::{rejection::JsonRejection, Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{error, info, instrument};

use crate::domain::HintLanguage;
use crate::error::StoreError;
use crate::protocol::*;
use crate::state::AppState;

fn json_error(status: StatusCode, msg: &str) -> Response {
  (status, Json(ErrorOut { error: msg.to_string() })).into_response()
}

/// Malformed or wrong-typed JSON bodies are validation failures like any other.
fn bad_body(rejection: JsonRejection) -> Response {
  json_error(StatusCode::BAD_REQUEST, &format!("Invalid request body: {}", rejection.body_text()))
}

fn store_error(e: StoreError) -> Response {
  match e {
    StoreError::Empty => json_error(StatusCode::SERVICE_UNAVAILABLE, "Pokemon catalog is not initialized yet"),
    other => {
      error!(target: "pokeguess", error = %other, "Catalog error");
      json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { status: "ok", service: "Pokemon Guess Game" })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_quiz(State(state): State<Arc<AppState>>) -> Response {
  match state.quiz.new_challenge().await {
    Ok(ch) => {
      info!(target: "quiz", id = ch.id, "HTTP quiz served");
      Json(ch).into_response()
    }
    Err(e) => store_error(e),
  }
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_check(
  State(state): State<Arc<AppState>>,
  body: Result<Json<CheckIn>, JsonRejection>,
) -> Response {
  let Json(body) = match body {
    Ok(b) => b,
    Err(r) => return bad_body(r),
  };
  let (Some(id), Some(answer)) = (body.id, non_blank(&body.user_answer)) else {
    return json_error(StatusCode::BAD_REQUEST, "ID and answer are required");
  };
  let correct = state.quiz.check_answer(id, answer).await;
  let correct_name = state.quiz.reveal_name(id).await;
  info!(target: "quiz", id, %correct, "HTTP answer checked");
  Json(CheckOut { correct, correct_name }).into_response()
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_hints(State(state): State<Arc<AppState>>, Path(id): Path<u32>) -> Response {
  match state.quiz.get_hints(id).await {
    Ok(Some(h)) => Json(h).into_response(),
    Ok(None) => json_error(StatusCode::NOT_FOUND, "Pokemon not found"),
    Err(e) => store_error(e),
  }
}

#[instrument(level = "info", skip(state, q))]
pub async fn http_get_ai_hint(
  State(state): State<Arc<AppState>>,
  Path(id): Path<u32>,
  Query(q): Query<AiHintQuery>,
) -> Response {
  let language = HintLanguage::from_param(q.language.as_deref());
  match state.expert.ai_hint(id, language).await {
    Ok(Some(hint)) => Json(AiHintOut { hint }).into_response(),
    Ok(None) => json_error(StatusCode::NOT_FOUND, "Pokemon not found"),
    Err(e) => store_error(e),
  }
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_ask(
  State(state): State<Arc<AppState>>,
  body: Result<Json<AskIn>, JsonRejection>,
) -> Response {
  let Json(body) = match body {
    Ok(b) => b,
    Err(r) => return bad_body(r),
  };
  let Some(question) = non_blank(&body.question) else {
    return json_error(StatusCode::BAD_REQUEST, "question is required");
  };
  let answer = state.expert.ask(question).await;
  Json(AnswerOut { answer }).into_response()
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_detail(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> Response {
  if name.trim().is_empty() {
    return json_error(StatusCode::BAD_REQUEST, "name is required");
  }
  let answer = state.expert.detail(&name).await;
  Json(AnswerOut { answer }).into_response()
}

#[instrument(level = "info", skip(state, q))]
pub async fn http_get_battle_advice(State(state): State<Arc<AppState>>, Query(q): Query<BattleQuery>) -> Response {
  let (Some(attacker), Some(defender)) = (non_blank(&q.attacker), non_blank(&q.defender)) else {
    return json_error(StatusCode::BAD_REQUEST, "attacker and defender are required");
  };
  let answer = state.expert.battle_advice(attacker, defender).await;
  Json(AnswerOut { answer }).into_response()
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_story(
  State(state): State<Arc<AppState>>,
  body: Result<Json<StoryIn>, JsonRejection>,
) -> Response {
  let Json(body) = match body {
    Ok(b) => b,
    Err(r) => return bad_body(r),
  };
  let (Some(pokemon), Some(setting)) = (non_blank(&body.pokemon), non_blank(&body.setting)) else {
    return json_error(StatusCode::BAD_REQUEST, "pokemon and setting are required");
  };
  let answer = state.expert.story(pokemon, setting).await;
  Json(AnswerOut { answer }).into_response()
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_models(State(state): State<Arc<AppState>>) -> Response {
  match state.expert.models().await {
    Ok(models) => Json(ModelsOut { models }).into_response(),
    Err(e) => json_error(StatusCode::SERVICE_UNAVAILABLE, &e.to_string()),
  }
}

/// An empty POST (no JSON content type) pulls the configured model.
#[instrument(level = "info", skip(state, body))]
pub async fn http_post_pull_model(
  State(state): State<Arc<AppState>>,
  body: Result<Json<PullIn>, JsonRejection>,
) -> Response {
  let body = match body {
    Ok(Json(b)) => b,
    Err(JsonRejection::MissingJsonContentType(_)) => PullIn::default(),
    Err(r) => return bad_body(r),
  };
  let model = non_blank(&body.model).unwrap_or_else(|| state.generator.model()).to_string();
  match state.expert.pull_model(Some(&model)).await {
    Ok(status) => Json(PullOut { model, status }).into_response(),
    Err(e) => json_error(StatusCode::SERVICE_UNAVAILABLE, &e.to_string()),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_delete_cache(State(state): State<Arc<AppState>>) -> Response {
  let cleared = state.expert.clear_cache().await;
  Json(CacheClearedOut { cleared }).into_response()
}
