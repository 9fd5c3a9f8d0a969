//! HTTP scoring service.
//!
//! `GET /health` reports liveness. `POST /score` turns a raw feature record
//! into a default probability and a policy decision.

mod handlers;
mod state;

use std::collections::BTreeMap;

use axum::Router;
use axum::routing::{get, post};
use loan_structs::Decision;
use serde::{Deserialize, Serialize};

pub use handlers::{health, score};
pub use state::AppState;

/// Liveness response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Scoring request: raw feature name to raw value.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreRequest {
    pub features: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub probability: f64,
    pub decision: Decision,
    pub reasons: Vec<String>,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Builds the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/score", post(score))
        .with_state(state)
}
