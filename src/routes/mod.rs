//! Router assembly: quiz + AI endpoints, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{warn, Level};

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - quiz and AI endpoints at the root and again under `/api/pokemon`
/// - CORS (any origin unless an allow-list is configured)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let api: Router<Arc<AppState>> = Router::new()
        .route("/health", get(http::http_health))
        .route("/quiz", get(http::http_get_quiz))
        .route("/check", post(http::http_post_check))
        .route("/hints/:id", get(http::http_get_hints))
        .route("/ai-hint/:id", get(http::http_get_ai_hint))
        .route("/ask", post(http::http_post_ask))
        .route("/detail/:name", get(http::http_get_detail))
        .route("/battle-advice", get(http::http_get_battle_advice))
        .route("/generate-story", post(http::http_post_story))
        .route("/ai/models", get(http::http_get_models))
        .route("/ai/models/pull", post(http::http_post_pull_model))
        .route("/ai/cache", delete(http::http_delete_cache));

    Router::new()
        .merge(api.clone())
        .nest("/api/pokemon", api)
        .with_state(state)
        .layer(cors_layer(cors_origins))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(target: "pokeguess", origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
