//! JSON file-backed key-value persistence

use std::fs;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::shared::errors::AppError;

pub const CONFIG_KEY: &str = "config";
pub const HISTORY_KEY: &str = "history";
pub const ANOMALY_KEY: &str = "anomalies";

/// Durable key-value store: one `<key>.json` document per key under a
/// state directory. Every write is a full-state overwrite
/// (last-writer-wins, no partial merge).
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Load a key. Missing and corrupt documents both read as `None`;
    /// corrupt data is logged and the caller falls back to defaults.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.path_for(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => {
                debug!("No persisted state for key '{}'", key);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Corrupt persisted state for key '{}', using defaults: {}", key, e);
                None
            }
        }
    }

    /// Overwrite a key with the full serialized value
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| AppError::StorageError(e.to_string()))?;
        fs::write(self.path_for(key), json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::types::MonitorConfig;

    fn temp_store() -> FileStore {
        let dir = std::env::temp_dir().join(format!("tickmon-test-{}", uuid::Uuid::new_v4()));
        FileStore::new(dir).unwrap()
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let store = temp_store();
        let mut config = MonitorConfig::default();
        config.instruments.push("PEPE_USDT".to_string());
        config.short_threshold = 0.0015;

        store.save(CONFIG_KEY, &config).unwrap();
        let loaded: MonitorConfig = store.load(CONFIG_KEY).unwrap();

        assert_eq!(loaded.instruments, config.instruments);
        assert_eq!(loaded.short_threshold, 0.0015);
        assert_eq!(loaded.interval_secs, config.interval_secs);
    }

    #[test]
    fn test_missing_key_is_none() {
        let store = temp_store();
        let loaded: Option<MonitorConfig> = store.load(CONFIG_KEY);
        assert!(loaded.is_none());
    }

    #[test]
    fn test_corrupt_bytes_fall_back_to_none() {
        let store = temp_store();
        fs::write(store.path_for(CONFIG_KEY), "{not valid json!").unwrap();
        let loaded: Option<MonitorConfig> = store.load(CONFIG_KEY);
        assert!(loaded.is_none());
    }

    #[test]
    fn test_save_overwrites_previous_state() {
        let store = temp_store();
        let mut config = MonitorConfig::default();
        store.save(CONFIG_KEY, &config).unwrap();

        config.remove_instrument("ETH_USDT");
        store.save(CONFIG_KEY, &config).unwrap();

        let loaded: MonitorConfig = store.load(CONFIG_KEY).unwrap();
        assert!(!loaded.is_tracked("ETH_USDT"));
    }
}
