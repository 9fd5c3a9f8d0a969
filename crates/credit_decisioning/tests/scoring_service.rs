mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use credit_decisioning::commands::{ingest, train};
use credit_decisioning::server::{
    AppState, ErrorResponse, HealthResponse, ScoreResponse, router,
};
use http_body_util::BodyExt as _;
use loan_structs::{BASELINE_POLICY_REASON, DecisionPolicy};
use serde::de::DeserializeOwned;
use tower::ServiceExt as _;

use common::{project, quick_training};

async fn send<T: DeserializeOwned>(state: AppState, request: Request<Body>) -> (StatusCode, T) {
    let response = router(state).oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

fn score_request(features: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/score")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({ "features": features }).to_string(),
        ))
        .expect("request")
}

#[tokio::test]
async fn test_health() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = AppState::without_model(&dir.path().join("model.json"));

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("request");
    let (status, body): (_, HealthResponse) = send(state, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.status, "ok");
}

#[tokio::test]
async fn test_score_without_model() {
    let dir = tempfile::tempdir().expect("tempdir");
    let model_path = dir.path().join("artifacts/models/gbdt_model.json");
    let state = AppState::load(&model_path).expect("missing model is not fatal");

    let (status, body): (_, ErrorResponse) =
        send(state, score_request(&serde_json::json!({ "loan_amnt": 1000 }))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body.detail,
        format!(
            "Model not found at {}. Run: credit-decisioning train-all",
            model_path.display()
        )
    );
}

#[tokio::test]
async fn test_score_with_trained_model() {
    let (_dir, paths) = project();
    ingest::run(&paths).expect("ingest");
    train::run_with(&paths, &quick_training()).expect("train");
    let state = AppState::load(&paths.model_path).expect("load model");

    let features = serde_json::json!({
        "loan_amnt": 10000,
        "term": 36,
        "int_rate": 13.56,
        "grade": "B",
        "emp_length": "10+ years",
        "home_ownership": null,
        "favourite_colour": "blue"
    });
    let (status, body): (_, ScoreResponse) = send(state.clone(), score_request(&features)).await;

    assert_eq!(status, StatusCode::OK);
    assert!((0.0..=1.0).contains(&body.probability));
    assert_eq!(body.decision, DecisionPolicy::default().decide(body.probability));
    assert_eq!(body.reasons, vec![BASELINE_POLICY_REASON.to_string()]);

    let (status, empty): (_, ScoreResponse) =
        send(state, score_request(&serde_json::json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert!((0.0..=1.0).contains(&empty.probability));
}

#[tokio::test]
async fn test_risky_record_scores_higher() {
    let (_dir, paths) = project();
    ingest::run(&paths).expect("ingest");
    train::run_with(&paths, &quick_training()).expect("train");
    let state = AppState::load(&paths.model_path).expect("load model");

    let safe = serde_json::json!({ "int_rate": 7.0, "grade": "A" });
    let risky = serde_json::json!({ "int_rate": 24.0, "grade": "E" });

    let (_, safe): (_, ScoreResponse) = send(state.clone(), score_request(&safe)).await;
    let (_, risky): (_, ScoreResponse) = send(state, score_request(&risky)).await;

    assert!(risky.probability > safe.probability);
}
