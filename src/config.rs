//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

const DEFAULT_ADAPTER_WAIT_MS: u64 = 10_000;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Firebase web API key (public)
    pub firebase_api_key: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Bound on the adapter readiness wait
    pub adapter_wait: Duration,
    /// Path to a local-storage JSON export to migrate, if any
    pub local_export_path: Option<String>,
    /// Directory for backup files, if backups are requested
    pub backup_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            firebase_api_key: env::var("FIREBASE_API_KEY")
                .map_err(|_| ConfigError::Missing("FIREBASE_API_KEY"))?,
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            adapter_wait: Duration::from_millis(
                env::var("ADAPTER_WAIT_TIMEOUT_MS")
                    .unwrap_or_else(|_| DEFAULT_ADAPTER_WAIT_MS.to_string())
                    .parse()
                    .unwrap_or(DEFAULT_ADAPTER_WAIT_MS),
            ),
            local_export_path: env::var("LOCAL_EXPORT_PATH").ok(),
            backup_dir: env::var("BACKUP_DIR").ok(),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            firebase_api_key: "test_api_key".to_string(),
            gcp_project_id: "test-project".to_string(),
            adapter_wait: Duration::from_millis(500),
            local_export_path: None,
            backup_dir: None,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("FIREBASE_API_KEY", "test_key");
        env::set_var("ADAPTER_WAIT_TIMEOUT_MS", "2500");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.firebase_api_key, "test_key");
        assert_eq!(config.adapter_wait, Duration::from_millis(2500));
    }
}
