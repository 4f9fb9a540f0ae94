//! Runtime configuration and logging setup.

use std::path::PathBuf;

use anyhow::Context;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::store::ReconcilePolicy;

/// Application-level constants
pub const APP_NAME: &str = "clinic-booking";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const ENV_API_URL: &str = "CLINIC_API_URL";
pub const ENV_CACHE_PATH: &str = "CLINIC_CACHE_PATH";
pub const ENV_TIMEOUT_SECS: &str = "CLINIC_REQUEST_TIMEOUT_SECS";
pub const ENV_RECONCILE: &str = "CLINIC_RECONCILE";

/// Invalid configuration values.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{0} must be a positive number of seconds, got '{1}'")]
    InvalidTimeout(&'static str, String),

    #[error("{0}")]
    InvalidPolicy(String),
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClinicConfig {
    /// Base URL of the record store REST API
    pub api_base_url: String,
    /// SQLite file holding the local appointment mirror
    pub cache_path: PathBuf,
    pub request_timeout_secs: u64,
    pub reconcile: ReconcilePolicy,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            cache_path: default_cache_path(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            reconcile: ReconcilePolicy::default(),
        }
    }
}

impl ClinicConfig {
    /// Defaults overridden by `CLINIC_*` environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL) {
            let url = url.trim();
            if url.is_empty() {
                return Err(ConfigError::Empty(ENV_API_URL).into());
            }
            config.api_base_url = url.to_string();
        }

        if let Some(path) = lookup(ENV_CACHE_PATH) {
            if path.trim().is_empty() {
                return Err(ConfigError::Empty(ENV_CACHE_PATH).into());
            }
            config.cache_path = PathBuf::from(path);
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            config.request_timeout_secs = parse_timeout(&raw)
                .with_context(|| format!("Failed to read {}", ENV_TIMEOUT_SECS))?;
        }

        if let Some(raw) = lookup(ENV_RECONCILE) {
            config.reconcile = raw
                .parse::<ReconcilePolicy>()
                .map_err(ConfigError::InvalidPolicy)
                .with_context(|| format!("Failed to read {}", ENV_RECONCILE))?;
        }

        Ok(config)
    }
}

fn parse_timeout(raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidTimeout(ENV_TIMEOUT_SECS, raw.to_string())),
    }
}

/// Platform local data dir, or the working directory when none is known
pub fn app_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default location of the appointment cache database
pub fn default_cache_path() -> PathBuf {
    app_data_dir().join("cache.db")
}

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "clinic_booking_core=debug,warn"
    } else {
        "clinic_booking_core=info,warn"
    }
}

/// Install the global tracing subscriber. Safe to call more than once.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_filter())),
        )
        .try_init();
}
