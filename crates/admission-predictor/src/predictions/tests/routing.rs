use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::dataset::Table;
use crate::error::INTERNAL_ERROR_MESSAGE;
use crate::predictions::router::predict_handler;
use crate::predictions::{
    prediction_router, PredictPayload, INVALID_BODY_MESSAGE, MISSING_FIELDS_MESSAGE,
    MODEL_PREDICT_PATH, PREDICT_PATHS,
};

#[tokio::test]
async fn predict_route_ranks_matching_colleges() {
    let router = prediction_router(Arc::new(heuristic_service(pune_table())));

    let response = router
        .oneshot(json_request(
            "/predict",
            r#"{"marks": 85, "branch": "cs", "city": "pune"}"#,
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload,
        json!({
            "eligible_colleges": [
                {"college_name": "A", "branch": "CS", "city": "Pune", "chances": 95.0},
                {"college_name": "B", "branch": "CS", "city": "Pune", "chances": 65.0},
            ]
        })
    );
}

#[tokio::test]
async fn legacy_paths_share_the_same_handler() {
    for path in PREDICT_PATHS {
        let router = prediction_router(Arc::new(heuristic_service(pune_table())));
        let response = router
            .oneshot(json_request(
                path,
                r#"{"marks": "85", "branch": "Mechanical", "city": "pune"}"#,
            ))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK, "path {path}");
        assert_eq!(
            read_json_body(response).await,
            json!({ "eligible_colleges": [] })
        );
    }
}

#[tokio::test]
async fn get_returns_static_acknowledgement() {
    let router = prediction_router(Arc::new(heuristic_service(Table::empty())));

    let response = router
        .oneshot(
            Request::get("/predict_colleges")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json_body(response).await,
        json!({ "ok": true, "message": "POST JSON to this endpoint." })
    );
}

#[tokio::test]
async fn missing_fields_are_bad_requests() {
    let router = prediction_router(Arc::new(heuristic_service(pune_table())));

    let response = router
        .oneshot(json_request("/predict", r#"{"branch": "cs", "city": "pune"}"#))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json_body(response).await,
        json!({ "error": MISSING_FIELDS_MESSAGE })
    );
}

#[tokio::test]
async fn non_json_body_is_a_bad_request() {
    let router = prediction_router(Arc::new(heuristic_service(pune_table())));

    let response = router
        .oneshot(
            Request::post("/predict")
                .body(Body::from("marks=85"))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json_body(response).await,
        json!({ "error": INVALID_BODY_MESSAGE })
    );
}

#[tokio::test]
async fn empty_object_body_is_reported_as_missing_body() {
    let router = prediction_router(Arc::new(heuristic_service(pune_table())));

    let response = router
        .oneshot(json_request("/predict_colleges", "{}"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json_body(response).await,
        json!({ "error": INVALID_BODY_MESSAGE })
    );
}

#[tokio::test]
async fn unavailable_dataset_is_reported_not_crashed() {
    let service = Arc::new(heuristic_service(Table::empty()));

    for _ in 0..2 {
        let error = predict_handler(
            State(service.clone()),
            Ok(Json(PredictPayload {
                marks: Some(json!(85)),
                branch: Some("cs".to_string()),
                city: Some("pune".to_string()),
            })),
        )
        .await
        .err()
        .expect("dataset unavailable");

        let response = axum::response::IntoResponse::into_response(error);
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let payload = read_json_body(response).await;
        assert_eq!(payload, json!({ "error": "dataset unavailable" }));
        assert_ne!(payload["error"], INTERNAL_ERROR_MESSAGE);
    }
}

#[tokio::test]
async fn model_route_attaches_shared_chance() {
    let source = Arc::new(CountingSource {
        table: pune_table(),
        ..CountingSource::default()
    });
    let router = prediction_router(Arc::new(model_service(source, 0.8125)));

    let response = router
        .oneshot(json_request(
            MODEL_PREDICT_PATH,
            r#"{"marks": 85, "branch": "CS", "city": "Pune"}"#,
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["summary"], "Predicted chance: 81.25%");
    let colleges = payload["eligible_colleges"]
        .as_array()
        .expect("college list");
    assert_eq!(colleges.len(), 2);
    assert!(colleges
        .iter()
        .all(|college| college["predicted_chance"] == json!(81.25)));
    assert_eq!(colleges[0]["min"], json!(85.0));
    assert_eq!(colleges[0]["branch"], "cs");
}

#[tokio::test]
async fn model_route_without_model_is_unavailable() {
    let router = prediction_router(Arc::new(heuristic_service(pune_table())));

    let response = router
        .oneshot(json_request(
            MODEL_PREDICT_PATH,
            r#"{"marks": 85, "branch": "cs", "city": "pune"}"#,
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        read_json_body(response).await,
        json!({ "error": "prediction model unavailable" })
    );
}
