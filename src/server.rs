//! HTTP surface for the chat backend.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/v1/chat` | Answer a user message through the RAG pipeline |
//! | `GET`  | `/health/health` | Health check |
//!
//! Any pipeline failure maps to a generic internal error with message
//! detail — callers receive either a full answer or an explicit failure,
//! never a partial response. All origins are permitted (CORS) to support
//! browser-based clients.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::rag::RagPipeline;

/// Shared application state passed to route handlers.
#[derive(Clone)]
struct AppState {
    rag: Arc<RagPipeline>,
}

/// Build the application router.
pub fn router(rag: Arc<RagPipeline>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/chat", post(handle_chat))
        .route("/health/health", get(handle_health))
        .layer(cors)
        .with_state(AppState { rag })
}

/// Bind and serve until the process is terminated.
pub async fn run_server(bind: &str, rag: Arc<RagPipeline>) -> anyhow::Result<()> {
    let app = router(rag);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(%bind, "chat server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Deserialize)]
struct ChatRequest {
    user_id: String,
    message: String,
}

#[derive(Serialize)]
struct ChatResponse {
    response: String,
}

/// JSON error body: `{ "detail": "..." }`.
#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

struct AppError {
    status: StatusCode,
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            detail: self.detail,
        };
        (self.status, Json(body)).into_response()
    }
}

async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    info!(user_id = %request.user_id, "received chat request");

    let response = state
        .rag
        .answer(&request.user_id, &request.message)
        .await
        .map_err(|e| {
            error!(user_id = %request.user_id, error = %e, "chat request failed");
            AppError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                detail: format!("Error processing request: {}", e),
            }
        })?;

    Ok(Json(ChatResponse { response }))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
