//! Configuration Management
//!
//! Loads the manager configuration from a YAML (or JSON) file.

use crate::error::{ManagerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the config file location
pub const CONFIG_ENV_VAR: &str = "PD_MANAGER_CONFIG";

/// Location used by the testbed deployments
const SYSTEM_CONFIG_PATH: &str = "/etc/softfire/physical-device-manager.yaml";

fn default_user_agent() -> String {
    format!("pd-manager/{}", env!("CARGO_PKG_VERSION"))
}

/// Manager configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// JSON resource catalog. Relative paths are resolved against the config file.
    pub resources_file: PathBuf,
    /// Log file, defaults to the user config dir
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    /// Timeout for reservation backend calls. Transport default when unset.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Config {
    /// Config file to read: explicit path > env var > user config dir > system path
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return PathBuf::from(path);
        }
        if let Some(user_path) = dirs::config_dir().map(|p| p.join("pd-manager").join("config.yaml")) {
            if user_path.exists() {
                return user_path;
            }
        }
        PathBuf::from(SYSTEM_CONFIG_PATH)
    }

    /// Load configuration from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ManagerError::Configuration(format!(
                "config file {} not readable: {}",
                path.display(),
                e
            ))
        })?;

        let mut config = Self::from_yaml(&content)?;
        if config.resources_file.is_relative() {
            if let Some(dir) = path.parent() {
                config.resources_file = dir.join(&config.resources_file);
            }
        }
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| ManagerError::Configuration(format!("invalid config: {}", e)))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Get the log file path
    pub fn log_path(&self) -> PathBuf {
        if let Some(path) = &self.log_file {
            return path.clone();
        }
        default_log_path()
    }
}

pub fn default_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("pd-manager").join("pd-manager.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".pd-manager").join("pd-manager.log");
    }
    PathBuf::from("pd-manager.log")
}
