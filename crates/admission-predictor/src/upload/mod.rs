//! Bulk loading of a flat-file dataset into the relational store.

pub mod sql;

use crate::config::ConfigError;
use crate::dataset::{load_csv, ColumnSet, DatasetError, Record, Table};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::path::Path;
use tracing::{error, info};

pub use sql::SqlBatchSink;

/// Destination for batches of records.
pub trait BatchSink: Send {
    fn insert_batch(
        &mut self,
        batch: &[Record],
    ) -> impl Future<Output = Result<(), SinkError>> + Send;
}

/// Error raised by a sink for a single batch.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("batch rejected: {0}")]
    Rejected(String),
}

/// Failure that aborts the whole upload run.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("batch size must be at least 1")]
    InvalidBatchSize,
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// A batch the sink refused; the run carries on without it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    /// 1-based batch number.
    pub batch: usize,
    pub rows: usize,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadReport {
    pub total_rows: usize,
    pub uploaded_rows: usize,
    pub failures: Vec<BatchFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl UploadReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.uploaded_rows == self.total_rows
    }
}

/// Splits a dataset into fixed-size batches and records the outcome of each.
#[derive(Debug, Clone, Copy)]
pub struct BulkUploader {
    batch_size: usize,
}

impl BulkUploader {
    pub const DEFAULT_BATCH_SIZE: usize = 100;

    pub fn new(batch_size: usize) -> Result<Self, UploadError> {
        if batch_size == 0 {
            return Err(UploadError::InvalidBatchSize);
        }
        Ok(Self { batch_size })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Reads `path` with the full column set, then uploads it. Unreadable files abort the run.
    pub async fn upload_path<P, S>(&self, path: P, sink: &mut S) -> Result<UploadReport, UploadError>
    where
        P: AsRef<Path>,
        S: BatchSink,
    {
        let path = path.as_ref();
        let table = load_csv(path, ColumnSet::Full)?;
        info!(rows = table.len(), path = %path.display(), "loaded CSV for upload");
        Ok(self.upload_table(&table, sink).await)
    }

    pub async fn upload_table<S: BatchSink>(&self, table: &Table, sink: &mut S) -> UploadReport {
        let started_at = Utc::now();
        let total_rows = table.len();
        let mut uploaded_rows = 0;
        let mut failures = Vec::new();

        info!(total_rows, batch_size = self.batch_size, "starting upload");

        for (index, batch) in table.records().chunks(self.batch_size).enumerate() {
            let number = index + 1;
            match sink.insert_batch(batch).await {
                Ok(()) => {
                    uploaded_rows += batch.len();
                    info!(batch = number, rows = batch.len(), "uploaded batch");
                }
                Err(err) => {
                    error!(batch = number, rows = batch.len(), error = %err, "batch upload failed");
                    failures.push(BatchFailure {
                        batch: number,
                        rows: batch.len(),
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(uploaded_rows, total_rows, failed_batches = failures.len(), "upload complete");

        UploadReport {
            total_rows,
            uploaded_rows,
            failures,
            started_at,
            finished_at: Utc::now(),
        }
    }
}

impl Default for BulkUploader {
    fn default() -> Self {
        Self {
            batch_size: Self::DEFAULT_BATCH_SIZE,
        }
    }
}
