use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::payload::{PredictPayload, INVALID_BODY_MESSAGE};
use super::service::PredictionService;
use crate::dataset::RecordSource;
use crate::error::AppError;
use crate::scoring::{AdmissionModel, HeuristicResponse, ModelResponse, PredictionError, Query};

/// Paths answering the heuristic prediction; the extra two keep older clients working.
pub const PREDICT_PATHS: [&str; 3] = ["/predict", "/predict_colleges", "/api/predict_colleges"];
pub const MODEL_PREDICT_PATH: &str = "/api/v1/predict/model";

/// Router builder exposing the prediction endpoints.
pub fn prediction_router<S, M>(service: Arc<PredictionService<S, M>>) -> Router
where
    S: RecordSource + 'static,
    M: AdmissionModel + 'static,
{
    let router = PREDICT_PATHS
        .iter()
        .fold(Router::new(), |router, path| {
            router.route(
                path,
                get(acknowledge_handler).post(predict_handler::<S, M>),
            )
        });

    router
        .route(MODEL_PREDICT_PATH, post(model_predict_handler::<S, M>))
        .with_state(service)
}

pub(crate) async fn acknowledge_handler() -> Json<Value> {
    Json(json!({ "ok": true, "message": "POST JSON to this endpoint." }))
}

pub(crate) async fn predict_handler<S, M>(
    State(service): State<Arc<PredictionService<S, M>>>,
    payload: Result<Json<PredictPayload>, JsonRejection>,
) -> Result<Json<HeuristicResponse>, AppError>
where
    S: RecordSource + 'static,
    M: AdmissionModel + 'static,
{
    let query = query_from(payload)?;
    let response = service.predict(&query)?;

    info!(
        marks = query.marks,
        branch = %query.branch,
        city = %query.city,
        matches = response.eligible_colleges.len(),
        "scored heuristic prediction"
    );
    Ok(Json(response))
}

pub(crate) async fn model_predict_handler<S, M>(
    State(service): State<Arc<PredictionService<S, M>>>,
    payload: Result<Json<PredictPayload>, JsonRejection>,
) -> Result<Json<ModelResponse>, AppError>
where
    S: RecordSource + 'static,
    M: AdmissionModel + 'static,
{
    let query = query_from(payload)?;
    let response = service.predict_with_model(&query).await?;

    info!(
        marks = query.marks,
        branch = %query.branch,
        city = %query.city,
        rows = response.eligible_colleges.len(),
        "scored model prediction"
    );
    Ok(Json(response))
}

fn query_from(payload: Result<Json<PredictPayload>, JsonRejection>) -> Result<Query, AppError> {
    let Json(payload) = payload.map_err(|rejection| {
        debug!(%rejection, "rejected prediction body");
        PredictionError::Validation(INVALID_BODY_MESSAGE.to_string())
    })?;
    Ok(payload.into_query()?)
}
