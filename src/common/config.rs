//! Runtime configuration (backend URL, HTTP retry policy, refresh cadence).
//!
//! Loaded once per process. Sources, first match wins:
//! - a TOML file named by `PORTAL_CONFIG`
//! - `PORTAL_*` environment variables (a `.env` file is honoured)
//! - built-in defaults

use std::env;
use std::time::Duration;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Process-wide runtime configuration.
///
/// Shaped like:
///
/// backend_url = "https://api.example.com"
/// request_timeout_secs = 15
/// retry_attempts = 3
/// refresh_interval_secs = 30
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuntimeConfig {
    /// Base URL of the backend REST API, without a trailing slash.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Attempts per idempotent request before giving up.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: usize,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,
    /// Dashboard refetch cadence.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    /// Path of the daily bonus claim endpoint.
    #[serde(default = "default_claim_endpoint")]
    pub claim_endpoint: String,
    /// Where the CLI keeps the bearer token between runs.
    #[serde(default = "default_session_file")]
    pub session_file: String,
    #[serde(default = "default_admin_page_size")]
    pub admin_page_size: u32,
}

fn default_backend_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_retry_attempts() -> usize {
    3
}

fn default_backoff_base_ms() -> u64 {
    200
}

fn default_backoff_max_ms() -> u64 {
    3_000
}

fn default_refresh_interval_secs() -> u64 {
    30
}

fn default_claim_endpoint() -> String {
    "/api/rewards/daily-claim".to_string()
}

fn default_session_file() -> String {
    ".portal-session".to_string()
}

fn default_admin_page_size() -> u32 {
    10
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            request_timeout_secs: default_request_timeout_secs(),
            retry_attempts: default_retry_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_max_ms: default_backoff_max_ms(),
            refresh_interval_secs: default_refresh_interval_secs(),
            claim_endpoint: default_claim_endpoint(),
            session_file: default_session_file(),
            admin_page_size: default_admin_page_size(),
        }
    }
}

impl RuntimeConfig {
    #[inline]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[inline]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    /// Backoff before retry number `attempt` (0-based), capped at `backoff_max_ms`.
    pub fn backoff_delay(&self, attempt: usize) -> Duration {
        let factor = 2u64.saturating_pow(attempt.min(16) as u32);
        let delay = self.backoff_base_ms.saturating_mul(factor);
        Duration::from_millis(delay.min(self.backoff_max_ms))
    }

    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        let mut cfg: RuntimeConfig = toml::from_str(raw)?;
        cfg.normalize();
        Ok(cfg)
    }

    /// Load from `PORTAL_CONFIG` (TOML file) or `PORTAL_*` env vars.
    ///
    /// Never fails: a broken source is logged and defaults are used instead.
    pub fn load() -> Self {
        dotenv::dotenv().ok();

        if let Ok(path) = env::var("PORTAL_CONFIG") {
            match std::fs::read_to_string(&path) {
                Ok(raw) => match Self::from_toml_str(&raw) {
                    Ok(cfg) => return cfg,
                    Err(err) => log::warn!("Failed to parse config file {}: {}", path, err),
                },
                Err(err) => log::warn!("Failed to read config file {}: {}", path, err),
            }
        }

        match envy::prefixed("PORTAL_").from_env::<RuntimeConfig>() {
            Ok(mut cfg) => {
                cfg.normalize();
                cfg
            }
            Err(err) => {
                log::warn!("Failed to read PORTAL_* environment: {}, using defaults", err);
                RuntimeConfig::default()
            }
        }
    }

    fn normalize(&mut self) {
        while self.backend_url.ends_with('/') {
            self.backend_url.pop();
        }
        if self.retry_attempts == 0 {
            self.retry_attempts = 1;
        }
        if !self.claim_endpoint.starts_with('/') {
            self.claim_endpoint.insert(0, '/');
        }
    }
}

/// Global runtime configuration, loaded on first access.
pub static GLOBAL_RUNTIME_CONFIG: Lazy<RuntimeConfig> = Lazy::new(RuntimeConfig::load);

#[inline]
pub fn get_runtime_config() -> &'static RuntimeConfig {
    &GLOBAL_RUNTIME_CONFIG
}
