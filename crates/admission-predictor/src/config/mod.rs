use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub dataset: DatasetConfig,
    pub model: ModelConfig,
    pub upload: UploadConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .or_else(|_| env::var("PORT"))
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let table = env::var("DATASET_TABLE")
            .or_else(|_| env::var("SUPABASE_TABLE"))
            .unwrap_or_else(|_| "kaggle".to_string());
        let table = validate_table_name(&table)?;

        let batch_size = env::var("UPLOAD_BATCH_SIZE")
            .unwrap_or_else(|_| "100".to_string())
            .parse::<usize>()
            .ok()
            .filter(|size| *size > 0)
            .ok_or(ConfigError::InvalidBatchSize)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            dataset: DatasetConfig {
                path: env_path("DATASET_PATH", "kaggle_raw.csv"),
                database_url: database_url_from_env(),
                table,
            },
            model: ModelConfig {
                model_path: env_path("MODEL_PATH", "college_eligibility_model.json"),
                branch_encoder_path: env_path("BRANCH_ENCODER_PATH", "branch_encoder.json"),
                city_encoder_path: env_path("CITY_ENCODER_PATH", "city_encoder.json"),
            },
            upload: UploadConfig { batch_size },
        })
    }
}

fn env_path(key: &str, default: &str) -> PathBuf {
    env::var(key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

/// `DATABASE_URL` wins; otherwise a postgres URL is assembled from the `DB_*` parts.
fn database_url_from_env() -> Option<String> {
    if let Ok(url) = env::var("DATABASE_URL") {
        let url = url.trim().to_string();
        return (!url.is_empty()).then_some(url);
    }

    let host = env::var("DB_HOST").ok().filter(|host| !host.trim().is_empty())?;
    let port = env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
    let name = env::var("DB_NAME").unwrap_or_else(|_| "postgres".to_string());
    let user = env::var("DB_USER").unwrap_or_else(|_| "postgres".to_string());
    let password = env::var("DB_PASSWORD").unwrap_or_default();

    Some(format!("postgres://{user}:{password}@{host}:{port}/{name}"))
}

/// Table names are interpolated into SQL, so only plain identifiers are accepted.
pub fn validate_table_name(raw: &str) -> Result<String, ConfigError> {
    let name = raw.trim();
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(name.to_string())
    } else {
        Err(ConfigError::InvalidTable {
            value: raw.to_string(),
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where the admissions dataset lives.
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    /// CSV file backing the heuristic scorer.
    pub path: PathBuf,
    /// Relational store backing the model scorer and the bulk uploader.
    pub database_url: Option<String>,
    pub table: String,
}

/// Artifact locations for the classifier-backed scorer.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub model_path: PathBuf,
    pub branch_encoder_path: PathBuf,
    pub city_encoder_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub batch_size: usize,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTable { value: String },
    InvalidBatchSize,
    MissingDatabaseUrl,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTable { value } => {
                write!(f, "DATASET_TABLE '{value}' must be a plain SQL identifier")
            }
            ConfigError::InvalidBatchSize => {
                write!(f, "UPLOAD_BATCH_SIZE must be a positive integer")
            }
            ConfigError::MissingDatabaseUrl => {
                write!(f, "DATABASE_URL or DB_HOST must be set to reach the dataset store")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidTable { .. }
            | ConfigError::InvalidBatchSize
            | ConfigError::MissingDatabaseUrl => None,
        }
    }
}
