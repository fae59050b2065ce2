use admission_predictor::dataset::{load_or_empty, ColumnSet};
use admission_predictor::predictions::{prediction_router, DefaultPredictionService};
use admission_predictor::scoring::{score, Query, RESULT_LIMIT};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use std::io::Write;
use std::sync::Arc;
use tower::ServiceExt;

const DATASET: &str = " college_name ,branch, city ,mean,min,max
Alpha Institute,Computer Science,Pune,90,86,94
Beta College,Computer Science,Pune,60,55,66
Gamma University,Civil,Pune,70,65,75
Delta Institute,Computer Engineering,Mumbai,82,80,85
";

fn dataset_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write dataset");
    file
}

async fn post_predict(service: DefaultPredictionService, body: &str) -> (StatusCode, Value) {
    let response = prediction_router(Arc::new(service))
        .oneshot(
            Request::post("/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

#[tokio::test]
async fn csv_dataset_serves_ranked_predictions() {
    let file = dataset_file(DATASET);
    let table = load_or_empty(file.path(), ColumnSet::Heuristic);
    assert_eq!(table.len(), 4);

    let service = DefaultPredictionService::new(Arc::new(table));
    let (status, body) = post_predict(
        service,
        r#"{"marks": 85, "branch": "computer", "city": "PUNE"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["eligible_colleges"]
        .as_array()
        .expect("college list")
        .iter()
        .filter_map(|college| college["college_name"].as_str())
        .collect();
    assert_eq!(names, vec!["Alpha Institute", "Beta College"]);
}

#[tokio::test]
async fn missing_dataset_keeps_serving_structured_errors() {
    let table = load_or_empty("./no-such-dataset.csv", ColumnSet::Heuristic);
    let service = DefaultPredictionService::new(Arc::new(table));

    let (status, body) = post_predict(
        service,
        r#"{"marks": 85, "branch": "cs", "city": "pune"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "dataset unavailable");
}

#[tokio::test]
async fn dataset_missing_cutoff_column_is_unavailable() {
    let file = dataset_file("college_name,branch,city\nAlpha,CS,Pune\n");
    let table = load_or_empty(file.path(), ColumnSet::Heuristic);
    assert!(table.is_empty());

    let (status, _) = post_predict(
        DefaultPredictionService::new(Arc::new(table)),
        r#"{"marks": 85, "branch": "cs", "city": "pune"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[test]
fn every_returned_chance_is_bounded_and_sorted() {
    let mut contents = String::from("college_name,branch,city,mean\n");
    for i in 0..40 {
        contents.push_str(&format!("College {i},CS,Pune,{}\n", i * 7));
    }
    let file = dataset_file(&contents);
    let table = load_or_empty(file.path(), ColumnSet::Heuristic);

    for marks in [0.0, 33.3, 99.0, 180.0, 400.0] {
        let response = score(&table, &Query::new(marks, "cs", "pune")).expect("scores");
        assert!(response.eligible_colleges.len() <= RESULT_LIMIT);
        assert!(response
            .eligible_colleges
            .iter()
            .all(|college| (0.0..=100.0).contains(&college.chances)));
        assert!(response
            .eligible_colleges
            .windows(2)
            .all(|pair| pair[0].chances >= pair[1].chances));
    }
}
