use super::{Record, Table};
use crate::config::validate_table_name;
use sqlx::any::{AnyConnectOptions, AnyRow};
use sqlx::{AnyConnection, Connection, Row};
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

/// Backing store the model scorer reads from on every request.
pub trait RecordSource: Send + Sync {
    fn fetch(&self) -> impl Future<Output = Result<Table, SourceError>> + Send;
}

impl<T: RecordSource> RecordSource for Arc<T> {
    fn fetch(&self) -> impl Future<Output = Result<Table, SourceError>> + Send {
        (**self).fetch()
    }
}

/// Error enumeration for backing store failures.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("table name '{0}' is not a plain SQL identifier")]
    InvalidTable(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Reads the whole dataset table through `sqlx::Any`, one connection per fetch.
#[derive(Debug, Clone)]
pub struct SqlRecordSource {
    url: String,
    table: String,
}

impl SqlRecordSource {
    pub fn new(url: impl Into<String>, table: &str) -> Result<Self, SourceError> {
        let table =
            validate_table_name(table).map_err(|_| SourceError::InvalidTable(table.to_string()))?;
        Ok(Self {
            url: url.into(),
            table,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    async fn connect(&self) -> Result<AnyConnection, SourceError> {
        sqlx::any::install_default_drivers();
        let options = AnyConnectOptions::from_str(&self.url)?;
        Ok(AnyConnection::connect_with(&options).await?)
    }
}

impl RecordSource for SqlRecordSource {
    async fn fetch(&self) -> Result<Table, SourceError> {
        let mut conn = self.connect().await?;
        let query = format!(
            "SELECT \"college_name\", \"branch\", \"city\", \"mean\", \"min\", \"max\" FROM \"{}\"",
            self.table
        );

        let rows = sqlx::query(&query).fetch_all(&mut conn).await?;
        conn.close().await?;

        let fetched = rows.len();
        let records: Vec<Record> = rows
            .iter()
            .enumerate()
            .filter_map(|(index, row)| match record_from_row(row) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!(
                        row = index + 1,
                        error = %err,
                        table = %self.table,
                        "skipping unreadable row"
                    );
                    None
                }
            })
            .collect();

        debug!(
            fetched,
            kept = records.len(),
            table = %self.table,
            "fetched dataset from store"
        );
        Ok(Table::new(records))
    }
}

fn record_from_row(row: &AnyRow) -> Result<Record, sqlx::Error> {
    Ok(Record {
        college_name: row.try_get("college_name")?,
        branch: row.try_get("branch")?,
        city: row.try_get("city")?,
        mean: row.try_get("mean")?,
        min: row.try_get("min")?,
        max: row.try_get("max")?,
    })
}
