//! HTTP API for the inference endpoint.
//!
//! Routes:
//! - POST /predict — answer a health question
//! - GET /health — liveness, uptime, loaded model
//! - GET /model — loaded checkpoint details
//!
//! A single mutex guards the responder: generation is not reentrant, so at
//! most one request is in flight at a time and the rest queue on the lock.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::Config;
use crate::inference::responder::Responder;

/// Application state shared across handlers.
pub struct AppState {
    pub responder: Mutex<Responder>,
    pub config: Arc<Config>,
    pub start_time: Instant,
}

/// Build the axum router with all API routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/health", get(health))
        .route("/model", get(model_info))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─── Request/Response Types ────────────────────────────────────────────────

/// Predict request.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    /// A health-related question for the AI to answer.
    pub question: String,
}

/// Predict response.
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub answer: String,
    pub model: String,
    pub duration_ms: u64,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub model: String,
}

/// Loaded checkpoint details.
#[derive(Debug, Serialize)]
pub struct ModelInfoResponse {
    pub weights_repo: String,
    pub weights_file: String,
    pub tokenizer_repo: String,
    pub max_new_tokens: usize,
}

// ─── Route Handlers ────────────────────────────────────────────────────────

async fn predict(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, StatusCode> {
    let request_id = Uuid::new_v4().to_string();

    info!(
        request_id = %request_id,
        question_chars = req.question.len(),
        "Predict request"
    );

    let started = Instant::now();

    // Serializes requests: generation holds the lock for its full duration.
    let mut responder = state.responder.lock().await;
    let result = tokio::task::block_in_place(|| responder.answer(&req.question));
    drop(responder);

    match result {
        Ok(answer) => {
            let duration_ms = started.elapsed().as_millis() as u64;
            info!(
                request_id = %request_id,
                duration_ms,
                answer_chars = answer.len(),
                "Predict complete"
            );
            Ok(Json(PredictResponse {
                answer,
                model: state.config.model.weights_repo.clone(),
                duration_ms,
            }))
        }
        Err(e) => {
            // Per-request failure: no partial answer, the process keeps serving.
            error!(request_id = %request_id, error = %e, "Predict failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        model: state.config.model.weights_repo.clone(),
    })
}

async fn model_info(State(state): State<Arc<AppState>>) -> Json<ModelInfoResponse> {
    let model = &state.config.model;
    Json(ModelInfoResponse {
        weights_repo: model.weights_repo.clone(),
        weights_file: model.weights_file.clone(),
        tokenizer_repo: model.tokenizer_repo.clone(),
        max_new_tokens: state.config.generation.max_new_tokens,
    })
}
