//! JSON file configuration adapter.
//!
//! Implements [`ConfigPort`] over a single JSON document on disk.  A
//! missing file yields the default config; anything unreadable or
//! failing validation is reported, never silently replaced.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use log::{info, warn};

use crate::app::ports::ConfigPort;
use crate::config::SystemConfig;
use crate::error::ConfigError;

pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigPort for JsonConfigStore {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("JsonConfigStore: no config at {}, using defaults", self.path.display());
                return Ok(SystemConfig::default());
            }
            Err(e) => {
                warn!("JsonConfigStore: read error {}: {}", self.path.display(), e);
                return Err(ConfigError::IoError);
            }
        };

        let config: SystemConfig = serde_json::from_str(&text).map_err(|e| {
            warn!("JsonConfigStore: {} is corrupted: {}", self.path.display(), e);
            ConfigError::Corrupted
        })?;
        config.validate()?;
        info!("JsonConfigStore: loaded config from {}", self.path.display());
        Ok(config)
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let text = serde_json::to_string_pretty(config).map_err(|_| ConfigError::IoError)?;
        fs::write(&self.path, text).map_err(|e| {
            warn!("JsonConfigStore: write error {}: {}", self.path.display(), e);
            ConfigError::IoError
        })?;
        info!("JsonConfigStore: config saved to {}", self.path.display());
        Ok(())
    }
}
