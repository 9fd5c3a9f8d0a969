//! Axum handlers for the scoring service.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use feature_encoder::FeatureValue;
use loan_structs::BASELINE_POLICY_REASON;
use tracing::debug;

use crate::server::state::AppState;
use crate::server::{ErrorResponse, HealthResponse, ScoreRequest, ScoreResponse};

/// Health check handler
pub async fn health() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
        }),
    )
}

/// Scores one feature record.
///
/// # Errors
///
/// Responds with 500 and a remediation message when no model is loaded.
pub async fn score(
    State(state): State<AppState>,
    Json(payload): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Some(model) = state.model.as_deref() else {
        let detail = format!(
            "Model not found at {}. Run: credit-decisioning train-all",
            state.model_path.display()
        );
        return Err((StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { detail })));
    };

    let record: BTreeMap<String, FeatureValue> = payload
        .features
        .iter()
        .map(|(name, value)| (name.clone(), FeatureValue::from(value)))
        .collect();

    let probability = model.score(&record);
    let decision = state.policy.decide(probability);

    debug!(probability, %decision, fields = record.len(), "Scored record");

    Ok(Json(ScoreResponse {
        probability,
        decision,
        reasons: vec![BASELINE_POLICY_REASON.to_string()],
    }))
}
