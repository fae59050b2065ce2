use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use serde_json::Value;

use crate::dataset::{Record, RecordSource, SourceError, Table};
use crate::predictions::PredictionService;
use crate::scoring::{AdmissionModel, Features, LabelEncoder, ModelScorer};

pub(super) struct FixedModel(pub(super) f64);

impl AdmissionModel for FixedModel {
    fn predict_probability(&self, _features: &Features) -> f64 {
        self.0
    }
}

/// Store double that counts fetches so tests can assert there is no caching.
#[derive(Default)]
pub(super) struct CountingSource {
    pub(super) table: Table,
    pub(super) fetches: AtomicUsize,
    pub(super) offline: bool,
}

impl RecordSource for CountingSource {
    async fn fetch(&self) -> Result<Table, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.offline {
            return Err(SourceError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(self.table.clone())
    }
}

pub(super) type TestService = PredictionService<Arc<CountingSource>, FixedModel>;

pub(super) fn record(college: &str, branch: &str, city: &str, mean: f64) -> Record {
    Record {
        college_name: college.to_string(),
        branch: branch.to_string(),
        city: city.to_string(),
        mean,
        min: Some(mean - 5.0),
        max: Some(mean + 5.0),
    }
}

pub(super) fn pune_table() -> Table {
    Table::new(vec![
        record("A", "CS", "Pune", 90.0),
        record("B", "CS", "Pune", 60.0),
    ])
}

pub(super) fn heuristic_service(table: Table) -> TestService {
    PredictionService::new(Arc::new(table))
}

pub(super) fn model_service(source: Arc<CountingSource>, probability: f64) -> TestService {
    let scorer = ModelScorer::new(
        source,
        FixedModel(probability),
        LabelEncoder::from_classes(["civil", "cs"]),
        LabelEncoder::from_classes(["mumbai", "pune"]),
    );
    PredictionService::new(Arc::new(pune_table())).with_model(scorer)
}

pub(super) fn json_request(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}
