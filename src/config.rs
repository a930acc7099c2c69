/// Configuration module: alert settings stored as JSON.
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub alert: AlertConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AlertConfig {
    /// Shell command played at each phase switch; `#` comments it out.
    pub command: Option<String>,
    pub bell_fallback: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            command: None,
            bell_fallback: true,
        }
    }
}

impl Config {
    /// The file written on first run, with an example command commented out.
    pub fn starter() -> Self {
        Self {
            alert: AlertConfig {
                command: Some("# afplay ~/music/beep.mp3".to_string()),
                bell_fallback: true,
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(write_err)
    }

    /// Loads the config, writing a starter file when none exists and falling
    /// back to defaults when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            let config = Self::starter();
            if let Err(e) = config.save(path) {
                warn!("Could not create default config: {}", e);
            }
            return config;
        }

        match Self::from_file(path) {
            Ok(config) => config,
            Err(ConfigError::Format(e)) => {
                warn!("Invalid config format ({}), using defaults", e);
                let config = Self::default();
                if let Err(e) = config.save(path) {
                    warn!("Could not rewrite config: {}", e);
                }
                config
            }
            Err(e) => {
                warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }
}

pub fn config_dir() -> PathBuf {
    if let Some(home) = env::var_os("HOME") {
        PathBuf::from(home).join(".config").join("pomo-clock")
    } else {
        PathBuf::from(".")
    }
}

pub fn default_config_path() -> PathBuf {
    if env::var_os("HOME").is_some() {
        config_dir().join("config.json")
    } else {
        PathBuf::from("pomo-clock-config.json")
    }
}
