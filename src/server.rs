//! HTTP surface: `GET /api/news` serves the curated story list.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::get,
};

use crate::foundation::error::{NewsreelError, NewsreelResult};
use crate::news::gateway::{CachedGateway, NewsGateway};
use crate::news::story::Story;

/// Body of every failed `/api/news` response.
pub const NEWS_FAILURE_MESSAGE: &str = "Failed to fetch AI tooling intelligence.";
/// How long a successful upstream fetch is served before it is refreshed.
pub const NEWS_REVALIDATE: Duration = Duration::from_secs(300);

#[derive(Clone, Debug)]
pub struct AppState {
    gateway: CachedGateway,
}

impl AppState {
    pub fn new(gateway: NewsGateway) -> Self {
        Self::with_revalidate(gateway, NEWS_REVALIDATE)
    }

    pub fn with_revalidate(gateway: NewsGateway, revalidate: Duration) -> Self {
        Self {
            gateway: CachedGateway::new(gateway, revalidate),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/news", get(api_news))
        .route("/healthz", get(healthz))
        .with_state(Arc::new(state))
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, state: AppState) -> NewsreelResult<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| NewsreelError::validation(format!("failed to bind {addr}: {e}")))?;
    tracing::info!("newsreel server listening on {addr}");
    axum::serve(listener, router(state))
        .await
        .map_err(|e| NewsreelError::Other(e.into()))
}

async fn api_news(State(state): State<Arc<AppState>>) -> Response {
    let body = state
        .gateway
        .fetch_stories()
        .await
        .and_then(|stories| encode_stories(&stories));
    match body {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to fetch stories");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": NEWS_FAILURE_MESSAGE })),
            )
                .into_response()
        }
    }
}

async fn healthz() -> &'static str {
    "ok"
}

/// Serialize the story list as the `/api/news` JSON array.
pub(crate) fn encode_stories(stories: &[Story]) -> NewsreelResult<Vec<u8>> {
    serde_json::to_vec(stories)
        .map_err(|e| NewsreelError::serde(format!("failed to encode stories: {e}")))
}

#[cfg(test)]
#[path = "../tests/unit/server.rs"]
mod tests;
