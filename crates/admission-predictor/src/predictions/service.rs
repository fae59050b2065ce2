use std::sync::Arc;

use crate::dataset::{RecordSource, SqlRecordSource, Table};
use crate::scoring::{
    heuristic, AdmissionModel, HeuristicResponse, LogisticModel, ModelResponse, ModelScorer,
    PredictionError, Query,
};

/// Service composing the startup table with the optional classifier-backed scorer.
pub struct PredictionService<S, M> {
    table: Arc<Table>,
    model: Option<ModelScorer<S, M>>,
}

/// Production wiring: SQL-backed dataset and the logistic artifact.
pub type DefaultPredictionService = PredictionService<SqlRecordSource, LogisticModel>;

impl<S, M> PredictionService<S, M>
where
    S: RecordSource + 'static,
    M: AdmissionModel + 'static,
{
    pub fn new(table: Arc<Table>) -> Self {
        Self { table, model: None }
    }

    pub fn with_model(mut self, scorer: ModelScorer<S, M>) -> Self {
        self.model = Some(scorer);
        self
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn dataset_available(&self) -> bool {
        !self.table.is_empty()
    }

    pub fn model_enabled(&self) -> bool {
        self.model.is_some()
    }

    /// Distance heuristic against the startup table.
    pub fn predict(&self, query: &Query) -> Result<HeuristicResponse, PredictionError> {
        heuristic::score(&self.table, query)
    }

    /// Classifier-backed prediction; reads the store fresh on each call.
    pub async fn predict_with_model(
        &self,
        query: &Query,
    ) -> Result<ModelResponse, PredictionError> {
        match &self.model {
            Some(scorer) => scorer.predict(query).await,
            None => Err(PredictionError::ModelUnavailable),
        }
    }
}
