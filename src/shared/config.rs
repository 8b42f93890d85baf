use std::fs;

use serde::{Deserialize, Serialize};

use crate::shared::errors::ConfigError;
use crate::shared::types::SourceKind;

/// Deployment-level settings, loaded once at startup. User-tunable
/// monitor state lives in `MonitorConfig` and is persisted separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Which endpoint family to poll
    pub source: SourceKind,
    /// Base URL of the exchange REST API
    pub base_url: String,
    /// Directory holding the persisted JSON state
    pub state_dir: String,
    /// Maximum retained history entries per instrument
    pub history_cap: usize,
    /// Maximum retained anomaly records
    pub anomaly_cap: usize,
    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::Futures,
            base_url: "https://api.gateio.ws/api/v4".to_string(),
            state_dir: "state".to_string(),
            history_cap: 50,
            anomaly_cap: 20,
            request_timeout_secs: 10,
        }
    }
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load deployment configuration from a TOML file
    pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
        let config_content = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("Failed to read config file: {}", e)))?;

        let config: AppConfig = toml::from_str(&config_content)
            .map_err(|e| ConfigError::Corrupt(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }
}
