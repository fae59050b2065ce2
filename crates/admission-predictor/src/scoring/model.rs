use super::{clip_chance, PredictionError, Query};
use crate::config::ModelConfig;
use crate::dataset::{Record, RecordSource, Table};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, error};

/// Code assigned to labels the encoder never saw during training.
pub const FALLBACK_CODE: i64 = 0;

/// Single-row feature vector handed to the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Features {
    pub marks: f64,
    pub branch_code: i64,
    pub city_code: i64,
}

/// Opaque binary classifier estimating the student's overall admission chance.
pub trait AdmissionModel: Send + Sync {
    /// Probability of the positive class, expected in `[0, 1]`.
    fn predict_probability(&self, features: &Features) -> f64;
}

/// Logistic regression artifact: `{"intercept": f, "coefficients": [marks, branch, city]}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogisticModel {
    intercept: f64,
    coefficients: [f64; 3],
}

impl LogisticModel {
    pub fn new(intercept: f64, coefficients: [f64; 3]) -> Self {
        Self {
            intercept,
            coefficients,
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        read_artifact(path.as_ref())
    }
}

impl AdmissionModel for LogisticModel {
    fn predict_probability(&self, features: &Features) -> f64 {
        let [marks, branch, city] = self.coefficients;
        let z = self.intercept
            + marks * features.marks
            + branch * features.branch_code as f64
            + city * features.city_code as f64;
        1.0 / (1.0 + (-z).exp())
    }
}

/// Fixed category-to-code mapping established at training time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelEncoder {
    codes: HashMap<String, i64>,
}

#[derive(Deserialize)]
struct EncoderArtifact {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Codes follow class order; labels are compared trimmed and lowercased.
    pub fn from_classes<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut codes = HashMap::new();
        for (label, code) in classes.into_iter().zip(0_i64..) {
            codes.entry(normalize_label(label.as_ref())).or_insert(code);
        }
        Self { codes }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        let artifact: EncoderArtifact = read_artifact(path.as_ref())?;
        Ok(Self::from_classes(artifact.classes))
    }

    /// Unseen labels encode to [`FALLBACK_CODE`] instead of failing the request.
    pub fn encode(&self, label: &str) -> i64 {
        match self.codes.get(&normalize_label(label)) {
            Some(code) => *code,
            None => {
                debug!(label, "unseen category label; using fallback code");
                FALLBACK_CODE
            }
        }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Failure to read a model or encoder artifact.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid artifact {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

fn read_artifact<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ArtifactError> {
    let display = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
        path: display.clone(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Json {
        path: display,
        source,
    })
}

/// Model-variant projection; every row carries the same request-level chance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCollegeChance {
    pub college_name: String,
    pub branch: String,
    pub city: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub predicted_chance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub summary: String,
    pub eligible_colleges: Vec<ModelCollegeChance>,
}

/// Classifier-backed scorer reading its dataset fresh from `S` on every request.
pub struct ModelScorer<S, M> {
    source: S,
    model: M,
    branch_encoder: LabelEncoder,
    city_encoder: LabelEncoder,
}

impl<S: RecordSource> ModelScorer<S, LogisticModel> {
    /// Loads the logistic artifact and both encoders named in `config`.
    pub fn load(source: S, config: &ModelConfig) -> Result<Self, ArtifactError> {
        let model = LogisticModel::from_path(&config.model_path)?;
        let branch_encoder = LabelEncoder::from_path(&config.branch_encoder_path)?;
        let city_encoder = LabelEncoder::from_path(&config.city_encoder_path)?;
        Ok(Self::new(source, model, branch_encoder, city_encoder))
    }
}

impl<S, M> ModelScorer<S, M>
where
    S: RecordSource,
    M: AdmissionModel,
{
    pub fn new(
        source: S,
        model: M,
        branch_encoder: LabelEncoder,
        city_encoder: LabelEncoder,
    ) -> Self {
        Self {
            source,
            model,
            branch_encoder,
            city_encoder,
        }
    }

    pub async fn predict(&self, query: &Query) -> Result<ModelResponse, PredictionError> {
        let table = self.source.fetch().await.map_err(|err| {
            error!(error = %err, "failed to fetch dataset from store");
            PredictionError::DatasetUnavailable
        })?;

        if table.is_empty() {
            return Err(PredictionError::DatasetUnavailable);
        }

        Ok(self.rank(&table, query))
    }

    /// Exact lowercased match on branch and city, falling back to every row when nothing matches.
    pub fn rank(&self, table: &Table, query: &Query) -> ModelResponse {
        let branch = normalize_label(&query.branch);
        let city = normalize_label(&query.city);

        let features = Features {
            marks: query.marks,
            branch_code: self.branch_encoder.encode(&branch),
            city_code: self.city_encoder.encode(&city),
        };
        let predicted_chance = clip_chance(self.model.predict_probability(&features) * 100.0);

        let exact: Vec<&Record> = table
            .records()
            .iter()
            .filter(|record| {
                normalize_label(&record.branch) == branch && normalize_label(&record.city) == city
            })
            .collect();

        let rows = if exact.is_empty() {
            debug!(%branch, %city, "no exact match; returning the full table");
            table.records().iter().collect()
        } else {
            exact
        };

        ModelResponse {
            summary: format!("Predicted chance: {predicted_chance:.2}%"),
            eligible_colleges: rows
                .into_iter()
                .map(|record| ModelCollegeChance {
                    college_name: record.college_name.clone(),
                    branch: normalize_label(&record.branch),
                    city: normalize_label(&record.city),
                    min: record.min,
                    max: record.max,
                    predicted_chance,
                })
                .collect(),
        }
    }
}
