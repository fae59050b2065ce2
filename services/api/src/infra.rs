use admission_predictor::config::AppConfig;
use admission_predictor::dataset::{load_or_empty, ColumnSet, SqlRecordSource};
use admission_predictor::predictions::{DefaultPredictionService, PredictionService};
use admission_predictor::scoring::ModelScorer;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Loads the CSV once for the heuristic scorer and wires the model scorer when a store is configured.
/// Neither failure stops the service; the affected routes answer 503 instead.
pub(crate) fn build_prediction_service(config: &AppConfig) -> DefaultPredictionService {
    let table = load_or_empty(&config.dataset.path, ColumnSet::Heuristic);
    let service = PredictionService::new(Arc::new(table));

    let Some(url) = config.dataset.database_url.as_deref() else {
        info!("no database configured; model predictions disabled");
        return service;
    };

    let source = match SqlRecordSource::new(url, &config.dataset.table) {
        Ok(source) => source,
        Err(err) => {
            warn!(error = %err, "invalid dataset store; model predictions disabled");
            return service;
        }
    };

    match ModelScorer::load(source, &config.model) {
        Ok(scorer) => {
            info!(table = %config.dataset.table, "model predictions enabled");
            service.with_model(scorer)
        }
        Err(err) => {
            warn!(error = %err, "model artifacts unavailable; model predictions disabled");
            service
        }
    }
}
