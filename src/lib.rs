pub mod api;
pub mod error;
pub mod hook;
pub mod logging;
pub mod rate_limit;
pub mod trigger;
pub mod trigger_api;
pub mod utils;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::Instant;
use tokio::sync::Mutex;

use crate::error::{HookError, Result};
use crate::rate_limit::RateLimiter;
use crate::trigger_api::BuildTrigger;

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:4000";
pub const DEFAULT_TRIGGER_API_URL: &str = "https://app.bitrise.io";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct HookConfig {
    pub server: ServerConfig,
    pub trigger_api: TriggerApiConfig,
    pub slack: SlackConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TriggerApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for TriggerApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_TRIGGER_API_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct SlackConfig {
    pub signing_secret: Option<String>,
}

impl SlackConfig {
    /// Returns the signing secret if request signatures should be verified.
    pub fn signing_secret(&self) -> Option<&str> {
        self.signing_secret.as_deref().filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window_secs: 60,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for rolling log files; console only when unset
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: None,
            file_prefix: "trigger_hook".to_string(),
        }
    }
}

/// Load and parse the configuration file.
/// A missing file yields the default configuration.
pub fn load_config(path: &Path) -> Result<HookConfig> {
    if !path.exists() {
        return Ok(HookConfig::default());
    }

    let config_str = std::fs::read_to_string(path).map_err(|e| {
        HookError::ConfigError(format!("Failed to read config file '{}': {}", path.display(), e))
    })?;

    toml::from_str(&config_str).map_err(|e| {
        HookError::ConfigError(format!(
            "Failed to parse config file '{}': {}",
            path.display(),
            e
        ))
    })
}

/// Request counters reported by the status endpoint
#[derive(Debug, Default)]
pub struct HookStats {
    pub requests: AtomicU64,
    pub builds_triggered: AtomicU64,
    pub trigger_failures: AtomicU64,
}

pub struct AppState {
    pub config: HookConfig,
    pub trigger_client: Arc<dyn BuildTrigger>,
    pub rate_limiter: Mutex<RateLimiter>,
    pub stats: HookStats,
    pub start_time: Instant,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: HookConfig, trigger_client: Arc<dyn BuildTrigger>) -> Self {
        Self {
            config,
            trigger_client,
            rate_limiter: Mutex::new(RateLimiter::new()),
            stats: HookStats::default(),
            start_time: Instant::now(),
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<AppState>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_fill_missing_sections() {
        let config: HookConfig = toml::from_str(
            r#"
            [trigger_api]
            base_url = "http://localhost:9000"

            [slack]
            signing_secret = "s3cr3t"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.trigger_api.base_url, "http://localhost:9000");
        assert_eq!(config.trigger_api.timeout_secs, 30);
        assert_eq!(config.slack.signing_secret(), Some("s3cr3t"));
        assert_eq!(config.rate_limit.max_requests, 10);
        assert!(config.logging.directory.is_none());
    }

    #[test]
    fn empty_signing_secret_disables_verification() {
        let slack = SlackConfig {
            signing_secret: Some(String::new()),
        };
        assert_eq!(slack.signing_secret(), None);
    }

    #[test]
    fn missing_config_file_uses_defaults() {
        let config = load_config(Path::new("/nonexistent/hook_config.toml")).unwrap();
        assert_eq!(config.trigger_api.base_url, DEFAULT_TRIGGER_API_URL);
    }
}
