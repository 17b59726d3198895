//! # Configuration for FitHaus
//!
//! Central configuration structures for every FitHaus component: the database
//! pool, the filtered-listing engine and the background generation queue.
//!
//! The configuration is an explicit value. It is loaded once at startup and
//! handed by reference to whatever needs it; nothing reads it through globals.
//!
//! ### TOML File Configuration
//! ```toml
//! [database]
//! host = "localhost"
//! port = 5432
//! database = "fithaus"
//! username = "postgres"
//! password = "password"
//! min_connections = 1
//! max_connections = 10
//! connection_timeout_seconds = 30
//! idle_timeout_seconds = 600
//! max_lifetime_seconds = 3600
//! statement_timeout_ms = 5000
//!
//! [query]
//! default_limit = 10
//! unknown_keys = "reject"   # or "pass_through"
//!
//! [generation]
//! queue_capacity = 64
//! workers = 2
//! job_timeout_seconds = 120
//! ```
//!
//! `pass_through` only checks that an unknown key is a well-formed identifier.
//! The store still has to accept it: a key naming a column the table lacks, or
//! a non-text column compared with the text value, fails in the database and
//! surfaces as an internal error rather than bad input.
//!
//! Load configuration:
//! ```rust,no_run
//! use config::AppConfig;
//!
//! // Load from the path in FITHAUS_CONFIG, or ./fithaus.toml
//! let config = AppConfig::load()?;
//!
//! // Or load from a custom path
//! let config = AppConfig::from_file("config/production.toml")?;
//! # Ok::<(), config::ConfigError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::{env, path::Path, time::Duration};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "./fithaus.toml";
const CONFIG_PATH_VAR: &str = "FITHAUS_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub min_connections: u32,
    pub max_connections: u32,
    /// Upper bound for acquiring a pooled connection
    pub connection_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
    pub max_lifetime_seconds: u64,
    /// Deadline applied to every individual store operation
    #[serde(default = "default_statement_timeout_ms")]
    pub statement_timeout_ms: u64,
}

/// How the listing engine treats filter keys that match no known column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownKeyPolicy {
    /// Fail the request with a bad-input error naming the key
    #[default]
    Reject,
    /// Compile the key into a text comparison on the base table.
    ///
    /// The column is not checked against the schema. Missing columns and
    /// non-text columns are database errors, reported as internal failures.
    PassThrough,
}

/// Filtered listing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Page size used when the client sends no `limit`; 0 disables pagination
    #[serde(default = "default_limit")]
    pub default_limit: u32,
    #[serde(default)]
    pub unknown_keys: UnknownKeyPolicy,
}

/// Background generation queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub queue_capacity: usize,
    pub workers: usize,
    pub job_timeout_seconds: u64,
}

fn default_statement_timeout_ms() -> u64 {
    5_000
}

fn default_limit() -> u32 {
    10
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            unknown_keys: UnknownKeyPolicy::default(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            workers: 2,
            job_timeout_seconds: 120,
        }
    }
}

impl AppConfig {
    /// Load configuration from the TOML file named in .env / environment or the default path
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env file is fine; the variable may come from the real environment.
        let _ = dotenvy::dotenv();

        if let Ok(config_path) = env::var(CONFIG_PATH_VAR) {
            Self::from_file(&config_path)
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::from_file(DEFAULT_CONFIG_PATH)
        } else {
            Err(ConfigError::Invalid(format!(
                "Config path must be specified as {} or in {} file",
                CONFIG_PATH_VAR, DEFAULT_CONFIG_PATH
            )))
        }
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;

        if self.generation.queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "Generation queue_capacity must be greater than 0".to_string(),
            ));
        }
        if self.generation.workers == 0 {
            return Err(ConfigError::Invalid(
                "Generation workers must be greater than 0".to_string(),
            ));
        }
        if self.generation.job_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "Generation job_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl DatabaseConfig {
    /// Create a new database configuration
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        host: String,
        port: u16,
        database: String,
        username: String,
        password: String,
        min_connections: u32,
        max_connections: u32,
        connection_timeout_seconds: u64,
        idle_timeout_seconds: u64,
        max_lifetime_seconds: u64,
    ) -> Self {
        Self {
            host,
            port,
            database,
            username,
            password,
            min_connections,
            max_connections,
            connection_timeout_seconds,
            idle_timeout_seconds,
            max_lifetime_seconds,
            statement_timeout_ms: default_statement_timeout_ms(),
        }
    }

    /// Build connection string
    pub fn connection_string(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_seconds)
    }

    pub fn statement_timeout(&self) -> Duration {
        Duration::from_millis(self.statement_timeout_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::Invalid(
                "Database host cannot be empty".to_string(),
            ));
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid(
                "Database port cannot be zero".to_string(),
            ));
        }
        if self.database.is_empty() {
            return Err(ConfigError::Invalid(
                "Database name cannot be empty".to_string(),
            ));
        }
        if self.username.is_empty() {
            return Err(ConfigError::Invalid(
                "Database username cannot be empty".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "Database max_connections must be greater than 0".to_string(),
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(ConfigError::Invalid(
                "Database min_connections cannot be greater than max_connections".to_string(),
            ));
        }
        if self.connection_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "Database connection_timeout_seconds must be greater than 0".to_string(),
            ));
        }
        if self.statement_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "Database statement_timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl GenerationConfig {
    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_seconds)
    }
}
