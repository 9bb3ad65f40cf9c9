//! Engine configuration, loaded from JSON. Every field has a default so a
//! partial file is enough.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// A level like `info` or a full filter such as `info,apisync=debug`.
    pub level: String,
    /// Emit JSON lines instead of text.
    pub json: bool,
    pub with_targets: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            with_targets: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Seconds between two sync cycles of a session.
    pub poll_interval_secs: u64,
    /// How long `stop` waits for the worker to notice the stop flag.
    pub stop_grace_millis: u64,
    /// Purge cached responses of a connection when its session stops.
    pub clear_cache_on_stop: bool,
    pub http_timeout_secs: u64,
    /// Mirror every session log entry to this append-only file.
    pub log_file: Option<PathBuf>,
    pub log: LogConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            stop_grace_millis: 5000,
            clear_cache_on_stop: true,
            http_timeout_secs: 30,
            log_file: None,
            log: LogConfig::default(),
        }
    }
}

impl SyncConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn stop_grace(&self) -> Duration {
        Duration::from_millis(self.stop_grace_millis)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: SyncConfig = serde_json::from_str(r#"{"poll_interval_secs": 2, "log": {"json": true}}"#).unwrap();
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.stop_grace_millis, 5000);
        assert!(config.clear_cache_on_stop);
        assert!(config.log.json);
        assert_eq!(config.log.level, "info");
    }
}
