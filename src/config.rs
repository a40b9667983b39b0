//! Configuration management for the Book Library client

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the catalog API, e.g. `http://localhost:4000/api`
    pub base_url: String,
    /// Optional per-request timeout. No timeout when unset.
    pub timeout_secs: Option<u64>,
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// File holding persisted key/value strings (the session lives here)
    pub path: PathBuf,
    /// Key the session record is stored under
    pub session_key: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    /// Write logs to daily rolling files in this directory instead of stderr
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Environment variables, e.g. BOOK_LIBRARY_API__BASE_URL
            .add_source(
                Environment::with_prefix("BOOK_LIBRARY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("api.base_url", env::var("API_BASE_URL").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000/api".to_string(),
            timeout_secs: None,
            user_agent: format!("book-library/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".book-library/storage.json"),
            session_key: "user".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            directory: None,
        }
    }
}
