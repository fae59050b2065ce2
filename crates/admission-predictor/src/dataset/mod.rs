//! Admission cutoff records and the loaders that produce them.
//!
//! A [`Table`] is built once (from CSV at startup, or per request from the
//! relational store) and is never mutated afterwards. An empty table is the
//! explicit "dataset unavailable" state; scorers refuse to run against it.

pub mod loader;
pub mod store;

use serde::{Deserialize, Serialize};

pub use loader::{load_csv, load_or_empty, read_csv};
pub use store::{RecordSource, SourceError, SqlRecordSource};

/// One historical cutoff row for a college, branch, and city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub college_name: String,
    pub branch: String,
    pub city: String,
    pub mean: f64,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

/// Ordered, read-only collection of records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    records: Vec<Record>,
}

impl Table {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// The "unavailable" table substituted when loading fails.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }
}

impl FromIterator<Record> for Table {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Header sets a dataset must carry before it is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSet {
    /// Enough to run the distance heuristic.
    Heuristic,
    /// Every column the model scorer projects; also what the uploader writes.
    Full,
}

impl ColumnSet {
    pub fn required(self) -> &'static [&'static str] {
        match self {
            ColumnSet::Heuristic => &["branch", "city", "mean"],
            ColumnSet::Full => &["college_name", "branch", "city", "mean", "min", "max"],
        }
    }

    /// First required column missing from `headers`, if any.
    pub fn missing_from(self, headers: &[&str]) -> Option<&'static str> {
        self.required()
            .iter()
            .copied()
            .find(|required| !headers.iter().any(|header| header.trim() == *required))
    }
}

/// Failure to produce a table from a flat file.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid dataset CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("required column '{0}' not found in dataset")]
    MissingColumn(&'static str),
}
