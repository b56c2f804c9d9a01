use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::config::RakutenConfig;
use crate::fetcher::{FetchError, RankingSource};
use crate::models::{RankingMode, RankingQuery};
use crate::processor::RankingService;

/// Shared server state. Credentials live here and never reach clients;
/// every upstream call goes through the server-side gateway.
pub struct AppState {
    pub config: RakutenConfig,
    pub source: Arc<dyn RankingSource>,
    pub service: RankingService,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/rakuten", get(proxy_ranking))
        .route("/api/ranking", get(ranking))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct RankingParams {
    #[serde(rename = "genreId")]
    genre_id: Option<String>,
    mode: Option<RankingMode>,
}

async fn health() -> &'static str {
    "ok"
}

/// Credential-holding passthrough to the upstream ranking endpoint.
/// Returns the upstream JSON verbatim, or a fixed error body with 500.
async fn proxy_ranking(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RankingParams>,
) -> Response {
    let genre_id = state.config.resolve_genre(params.genre_id.as_deref());
    let query = RankingQuery::new(genre_id, RankingMode::Popularity);

    match state.source.fetch_raw(&query).await {
        Ok(body) => Json(body).into_response(),
        Err(e) => {
            error!("Proxy fetch failed for genre {}: {}", query.genre_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "failed to fetch data" })),
            )
                .into_response()
        }
    }
}

/// Normalized, derived, mode-ordered ranking for one genre.
async fn ranking(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RankingParams>,
) -> Response {
    let genre_id = state.config.resolve_genre(params.genre_id.as_deref());
    let mode = params.mode.unwrap_or(RankingMode::Popularity);
    let query = RankingQuery::new(genre_id, mode);

    match state.service.get_ranking(&query).await {
        Ok(result) => Json(result.as_ref()).into_response(),
        Err(e) => {
            error!(
                "Ranking fetch failed for genre {} ({} mode): {}",
                query.genre_id,
                query.mode.as_str(),
                e
            );
            let status = if e.is_config() {
                StatusCode::INTERNAL_SERVER_ERROR
            } else {
                StatusCode::BAD_GATEWAY
            };
            (status, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}
