//! Booth configuration
//!
//! Loaded once per session from a JSON document:
//!
//! ```json
//! {
//!   "database": { "backend": "redb", "path": "./work_dir/booth.redb" },
//!   "maxCapacity": 10,
//!   "boothId": "CR1",
//!   "slots": ["10:00", "11:00", "13:00"],
//!   "retry": { "maxAttempts": 16, "baseDelayMs": 5, "maxDelayMs": 250 },
//!   "logLevel": "info"
//! }
//! ```
//!
//! Every field has a default, so `{}` is a valid configuration.

use std::path::{Path, PathBuf};

use booth_store::transaction::RetryPolicy;
use serde::{Deserialize, Serialize};
use shared::models::is_valid_time_slot;
use shared::types::{Capacity, DEFAULT_BOOTH_ID, DEFAULT_MAX_CAPACITY};
use thiserror::Error;

/// Env var naming the configuration file
pub const CONFIG_PATH_ENV: &str = "BOOTH_CONFIG";
/// Env var overriding `database.path`
pub const DB_PATH_ENV: &str = "BOOTH_DB_PATH";
/// Env var overriding `logLevel`
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

const DEFAULT_CONFIG_PATHS: [&str; 2] = ["config.json", "../config.json"];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No configuration found (tried {})", .0.join(", "))]
    NotFound(Vec<String>),
}

/// Which realtime database backend a session talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process store, lost on exit
    #[default]
    Memory,
    /// Embedded redb file
    Redb,
}

/// Backing-service connection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    /// Database file, used by the redb backend
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            path: "./work_dir/booth.redb".to_string(),
        }
    }
}

/// Capacity update retry settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryConfig {
    pub max_attempts: usize,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            self.base_delay_ms,
            self.max_delay_ms,
            RetryPolicy::default().jitter_pct,
        )
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            base_delay_ms: policy.base_delay_ms,
            max_delay_ms: policy.max_delay_ms,
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoothConfig {
    pub database: DatabaseConfig,
    /// Seats per slot. Zero or negative falls back to the default.
    pub max_capacity: Capacity,
    pub booth_id: String,
    /// Slots offered even before anyone has reserved them
    pub slots: Vec<String>,
    pub retry: RetryConfig,
    pub log_level: String,
    /// JSON log lines instead of the pretty console format
    pub log_json: bool,
    /// Directory for rolling log files; console only when unset
    pub log_dir: Option<String>,
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            max_capacity: DEFAULT_MAX_CAPACITY,
            booth_id: DEFAULT_BOOTH_ID.to_string(),
            slots: Vec::new(),
            retry: RetryConfig::default(),
            log_level: "info".to_string(),
            log_json: false,
            log_dir: None,
        }
    }
}

impl BoothConfig {
    /// Parse a configuration document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    /// Read and parse a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Load from `BOOTH_CONFIG` (or the default locations) and apply env overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// [`load`](Self::load) with variables taken from `lookup`
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
            Some(path) => Self::from_file(path)?,
            None => Self::from_default_locations()?,
        };
        config.apply_overrides(lookup);
        Ok(config)
    }

    fn from_default_locations() -> Result<Self, ConfigError> {
        for candidate in DEFAULT_CONFIG_PATHS {
            if Path::new(candidate).is_file() {
                tracing::debug!(path = candidate, "Loading configuration");
                return Self::from_file(candidate);
            }
        }
        Err(ConfigError::NotFound(
            DEFAULT_CONFIG_PATHS.iter().map(|p| p.to_string()).collect(),
        ))
    }

    /// Apply overrides from a key lookup (the process environment in [`load`](Self::load))
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup(DB_PATH_ENV).filter(|p| !p.is_empty()) {
            self.database.path = path;
        }
        if let Some(level) = lookup(LOG_LEVEL_ENV).filter(|l| !l.is_empty()) {
            self.log_level = level;
        }
    }

    /// Retry policy for capacity updates
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.policy()
    }

    fn normalized(mut self) -> Self {
        if self.max_capacity <= 0 {
            tracing::warn!(
                max_capacity = self.max_capacity,
                "Non-positive maxCapacity, using default"
            );
            self.max_capacity = DEFAULT_MAX_CAPACITY;
        }
        if self.booth_id.trim().is_empty() {
            self.booth_id = DEFAULT_BOOTH_ID.to_string();
        }
        self.slots = self
            .slots
            .into_iter()
            .map(|slot| slot.trim().to_string())
            .filter(|slot| {
                let valid = is_valid_time_slot(slot);
                if !valid && !slot.is_empty() {
                    tracing::warn!(time_slot = %slot, "Slot label is not a single path segment, skipped");
                }
                valid
            })
            .collect();
        self
    }
}
