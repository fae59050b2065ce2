use super::{clip_chance, PredictionError, Query};
use crate::dataset::{Record, Table};
use serde::{Deserialize, Serialize};

/// Maximum number of colleges returned by the heuristic scorer.
pub const RESULT_LIMIT: usize = 10;

/// Projection of a matching record with its distance-based chance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollegeChance {
    pub college_name: String,
    pub branch: String,
    pub city: String,
    pub chances: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeuristicResponse {
    pub eligible_colleges: Vec<CollegeChance>,
}

/// Ranks colleges by how close their historical cutoff sits to the student's marks.
///
/// Blank branch or city disables that filter. The chance is
/// `clip(100 - |mean - marks|, 0, 100)`; it is not a calibrated probability.
/// Ties keep table order.
pub fn score(table: &Table, query: &Query) -> Result<HeuristicResponse, PredictionError> {
    if table.is_empty() {
        return Err(PredictionError::DatasetUnavailable);
    }

    let branch = needle(&query.branch);
    let city = needle(&query.city);

    let mut ranked: Vec<CollegeChance> = table
        .records()
        .iter()
        .filter(|record| matches_filter(&record.branch, branch.as_deref()))
        .filter(|record| matches_filter(&record.city, city.as_deref()))
        .map(|record| chance_for(record, query.marks))
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.chances.total_cmp(&a.chances));
    ranked.truncate(RESULT_LIMIT);

    Ok(HeuristicResponse {
        eligible_colleges: ranked,
    })
}

fn needle(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

fn matches_filter(value: &str, needle: Option<&str>) -> bool {
    match needle {
        Some(needle) => value.to_lowercase().contains(needle),
        None => true,
    }
}

fn chance_for(record: &Record, marks: f64) -> CollegeChance {
    CollegeChance {
        college_name: record.college_name.clone(),
        branch: record.branch.clone(),
        city: record.city.clone(),
        chances: clip_chance(100.0 - (record.mean - marks).abs()),
    }
}
