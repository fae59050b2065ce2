use admission_predictor::config::{validate_table_name, AppConfig, ConfigError};
use admission_predictor::dataset::{load_csv, ColumnSet};
use admission_predictor::error::AppError;
use admission_predictor::predictions::PredictPayload;
use admission_predictor::scoring::{score, HeuristicResponse};
use admission_predictor::telemetry;
use admission_predictor::upload::{BulkUploader, SqlBatchSink, UploadReport};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    /// Student marks, compared against each college's mean cutoff
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) marks: f64,
    /// Branch filter (case-insensitive substring)
    #[arg(long)]
    pub(crate) branch: String,
    /// City filter (case-insensitive substring)
    #[arg(long)]
    pub(crate) city: String,
    /// CSV dataset to score against (defaults to DATASET_PATH)
    #[arg(long)]
    pub(crate) dataset: Option<PathBuf>,
    /// Print the raw JSON response instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct UploadArgs {
    /// CSV file with college_name, branch, city, mean, min and max columns
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Destination table (defaults to DATASET_TABLE)
    #[arg(long)]
    pub(crate) table: Option<String>,
    /// Rows per INSERT (defaults to UPLOAD_BATCH_SIZE)
    #[arg(long)]
    pub(crate) batch_size: Option<usize>,
    /// Connection string (defaults to DATABASE_URL or the DB_* variables)
    #[arg(long)]
    pub(crate) database_url: Option<String>,
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let PredictArgs {
        marks,
        branch,
        city,
        dataset,
        json,
    } = args;

    let config = AppConfig::load()?;
    let path = dataset.unwrap_or(config.dataset.path);

    let query = PredictPayload {
        marks: Some(serde_json::json!(marks)),
        branch: Some(branch),
        city: Some(city),
    }
    .into_query()?;

    let table = load_csv(&path, ColumnSet::Heuristic)?;
    let response = score(&table, &query)?;

    if json {
        let rendered = serde_json::to_string_pretty(&response).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        print!("{}", render_predictions(&response, query.marks));
    }

    Ok(())
}

pub(crate) async fn run_upload(args: UploadArgs) -> Result<(), AppError> {
    let UploadArgs {
        csv,
        table,
        batch_size,
        database_url,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let url = database_url
        .or(config.dataset.database_url)
        .ok_or(ConfigError::MissingDatabaseUrl)?;
    let table = match table {
        Some(raw) => validate_table_name(&raw)?,
        None => config.dataset.table,
    };
    let uploader = BulkUploader::new(batch_size.unwrap_or(config.upload.batch_size))?;

    let mut sink = SqlBatchSink::connect(&url, &table).await?;
    let report = uploader.upload_path(&csv, &mut sink).await;
    sink.close().await?;

    let report = report?;
    print!("{}", render_upload_report(&report, &table));
    Ok(())
}

fn render_predictions(response: &HeuristicResponse, marks: f64) -> String {
    if response.eligible_colleges.is_empty() {
        return "No colleges matched the requested branch and city.\n".to_string();
    }

    let mut out = format!("Top colleges for {marks:.2} marks\n");
    for (rank, college) in response.eligible_colleges.iter().enumerate() {
        out.push_str(&format!(
            "{:>2}. {} ({}, {}): {:.2}%\n",
            rank + 1,
            college.college_name,
            college.branch,
            college.city,
            college.chances
        ));
    }
    out
}

fn render_upload_report(report: &UploadReport, table: &str) -> String {
    let elapsed = report.finished_at - report.started_at;
    let mut out = format!(
        "Uploaded {}/{} rows into '{}' in {} ms\n",
        report.uploaded_rows,
        report.total_rows,
        table,
        elapsed.num_milliseconds()
    );
    for failure in &report.failures {
        out.push_str(&format!(
            "  batch {} ({} rows) failed: {}\n",
            failure.batch, failure.rows, failure.error
        ));
    }
    out
}
