//! HTTP boundary for admission predictions: request validation, the service
//! that owns the shared table, and the axum router.

pub mod payload;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use payload::{
    PredictPayload, INVALID_BODY_MESSAGE, INVALID_MARKS_MESSAGE, MISSING_FIELDS_MESSAGE,
};
pub use router::{prediction_router, MODEL_PREDICT_PATH, PREDICT_PATHS};
pub use service::{DefaultPredictionService, PredictionService};
