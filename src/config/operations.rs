//! Config loading, validation, and persistence.

use super::model::Config;
use crate::capabilities::Capability;
use crate::error::{OpsError, Result};
use crate::fs::atomic_write;
use std::path::Path;
use tracing::debug;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            OpsError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load config, using defaults when the file does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| OpsError::UserError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| OpsError::UserError(format!("failed to serialize config to YAML: {}", e)))
    }

    /// Validate and write the config atomically.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.validate()?;
        atomic_write(path, self.to_yaml()?.as_bytes())
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `max_output_chars` must be positive
    /// - `working_dir`, when set, must be non-empty
    /// - `capabilities` keys must be known capability config names
    pub fn validate(&self) -> Result<()> {
        if self.max_output_chars == 0 {
            return Err(OpsError::UserError(
                "config validation failed: max_output_chars must be greater than 0".to_string(),
            ));
        }

        if let Some(dir) = &self.working_dir
            && dir.as_os_str().is_empty()
        {
            return Err(OpsError::UserError(
                "config validation failed: working_dir must not be empty".to_string(),
            ));
        }

        for name in self.capabilities.keys() {
            if Capability::ALL.iter().all(|c| c.config_name() != name) {
                let known: Vec<&str> = Capability::ALL.iter().map(|c| c.config_name()).collect();
                return Err(OpsError::UserError(format!(
                    "config validation failed: unknown capability config '{}'. Known: {}",
                    name,
                    known.join(", ")
                )));
            }
        }

        Ok(())
    }
}
