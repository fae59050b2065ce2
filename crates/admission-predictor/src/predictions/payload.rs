use crate::scoring::{PredictionError, Query};
use serde::Deserialize;
use serde_json::Value;

pub const MISSING_FIELDS_MESSAGE: &str = "Missing fields: marks, branch, city are required.";
pub const INVALID_BODY_MESSAGE: &str = "Request body must be JSON.";
pub const INVALID_MARKS_MESSAGE: &str = "marks must be a number.";

/// Raw request body; fields stay optional so absence becomes a validation error, not a rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictPayload {
    #[serde(default)]
    pub marks: Option<Value>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

impl PredictPayload {
    /// `marks` may be a JSON number or a numeric string; branch and city are trimmed.
    /// A body carrying none of the fields counts as no body at all.
    pub fn into_query(self) -> Result<Query, PredictionError> {
        if self.marks.is_none() && self.branch.is_none() && self.city.is_none() {
            return Err(PredictionError::Validation(INVALID_BODY_MESSAGE.to_string()));
        }

        let branch = self.branch.as_deref().map(str::trim).unwrap_or_default();
        let city = self.city.as_deref().map(str::trim).unwrap_or_default();

        let Some(marks) = self.marks.filter(|value| !value.is_null()) else {
            return Err(missing_fields());
        };
        if branch.is_empty() || city.is_empty() {
            return Err(missing_fields());
        }

        Ok(Query::new(parse_marks(&marks)?, branch, city))
    }
}

fn missing_fields() -> PredictionError {
    PredictionError::Validation(MISSING_FIELDS_MESSAGE.to_string())
}

fn parse_marks(value: &Value) -> Result<f64, PredictionError> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed
        .filter(|marks| marks.is_finite())
        .ok_or_else(|| PredictionError::Validation(INVALID_MARKS_MESSAGE.to_string()))
}
