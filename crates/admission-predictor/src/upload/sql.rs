use super::{BatchSink, SinkError};
use crate::config::validate_table_name;
use crate::dataset::Record;
use sqlx::any::AnyConnectOptions;
use sqlx::{AnyConnection, Connection};
use std::str::FromStr;

const COLUMNS: [&str; 6] = ["college_name", "branch", "city", "mean", "min", "max"];

/// Bind parameters per statement: SQLite's default limit, below Postgres's 65535.
const MAX_BIND_PARAMS: usize = 32_766;

/// Rows per `INSERT`; larger batches are split across several statements.
const MAX_ROWS_PER_STATEMENT: usize = MAX_BIND_PARAMS / COLUMNS.len();

/// Inserts each batch inside one transaction, as multi-row `INSERT`s over a single connection.
pub struct SqlBatchSink {
    conn: AnyConnection,
    table: String,
}

impl SqlBatchSink {
    pub async fn connect(url: &str, table: &str) -> Result<Self, SinkError> {
        let table = validate_table_name(table)?;
        sqlx::any::install_default_drivers();
        let options = AnyConnectOptions::from_str(url)?;
        let conn = AnyConnection::connect_with(&options).await?;
        Ok(Self { conn, table })
    }

    pub async fn close(self) -> Result<(), SinkError> {
        self.conn.close().await?;
        Ok(())
    }
}

impl BatchSink for SqlBatchSink {
    async fn insert_batch(&mut self, batch: &[Record]) -> Result<(), SinkError> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut tx = self.conn.begin().await?;
        for rows in batch.chunks(MAX_ROWS_PER_STATEMENT) {
            let statement = insert_statement(&self.table, rows.len());
            let mut query = sqlx::query(&statement);
            for record in rows {
                query = query
                    .bind(record.college_name.clone())
                    .bind(record.branch.clone())
                    .bind(record.city.clone())
                    .bind(record.mean)
                    .bind(record.min)
                    .bind(record.max);
            }
            query.execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

/// `$n` placeholders are understood by both postgres and sqlite.
fn insert_statement(table: &str, rows: usize) -> String {
    let columns = COLUMNS
        .iter()
        .map(|column| format!("\"{column}\""))
        .collect::<Vec<_>>()
        .join(", ");

    let values = (0..rows)
        .map(|row| {
            let placeholders = (1..=COLUMNS.len())
                .map(|column| format!("${}", row * COLUMNS.len() + column))
                .collect::<Vec<_>>()
                .join(", ");
            format!("({placeholders})")
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!("INSERT INTO \"{table}\" ({columns}) VALUES {values}")
}
