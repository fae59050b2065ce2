//! Admission chance scorers.
//!
//! Two pipelines share the same query type but deliberately differ when the
//! filters match nothing: the distance heuristic answers with an empty list,
//! while the classifier-backed scorer falls back to the whole table.

pub mod heuristic;
pub mod model;

use serde::Serialize;

pub use heuristic::{score, CollegeChance, HeuristicResponse, RESULT_LIMIT};
pub use model::{
    AdmissionModel, ArtifactError, Features, LabelEncoder, LogisticModel, ModelCollegeChance,
    ModelResponse, ModelScorer, FALLBACK_CODE,
};

/// A student's request: score plus the branch and city they are after.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    pub marks: f64,
    pub branch: String,
    pub city: String,
}

impl Query {
    pub fn new(marks: f64, branch: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            marks,
            branch: branch.into(),
            city: city.into(),
        }
    }
}

/// Error raised while answering a prediction request.
#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("dataset unavailable")]
    DatasetUnavailable,
    #[error("prediction model unavailable")]
    ModelUnavailable,
    #[error("{0}")]
    Validation(String),
}

pub(crate) fn clip_chance(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}
