//! Configuration loading and environment overrides.

use super::{BindMode, Config};
use crate::env::{self, vars};
use crate::error::ConfigError;
use crate::paths;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load the effective configuration.
    ///
    /// An explicit path must exist. Without one, `MAPGATE_CONFIG` and then
    /// `~/.mapgate/mapgate.json5` are tried, falling back to defaults.
    /// Environment overrides are applied last.
    pub fn load_effective(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => match Self::discover_path() {
                Some(path) => {
                    debug!("Loading config from {}", path.display());
                    Self::load(&path)?
                }
                None => Self::default(),
            },
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn discover_path() -> Option<PathBuf> {
        if let Some(path) = env::get_var(vars::MAPGATE_CONFIG) {
            return Some(PathBuf::from(path));
        }
        paths::config_file().ok().filter(|p| p.exists())
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Serialize to a pretty JSON string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // json5 doesn't have a serializer, so we use serde_json with pretty print
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply `PORT`, `MAPGATE_BIND` and `MAPS_API_BASE` overrides.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(port) = env::get_var(vars::PORT) {
            self.gateway.port = port
                .parse()
                .map_err(|_| ConfigError::Validation(format!("Invalid PORT value: {}", port)))?;
        }
        if let Some(bind) = env::get_var(vars::MAPGATE_BIND) {
            self.gateway.bind = bind.parse::<BindMode>().map_err(ConfigError::Validation)?;
        }
        if let Some(base) = env::get_var(vars::MAPS_API_BASE) {
            self.maps.api_base = base;
        }
        Ok(())
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.gateway.port == 0 {
            errors.push("Gateway port cannot be 0".to_string());
        }

        if self.gateway.max_sessions == 0 {
            errors.push("Gateway max_sessions must be at least 1".to_string());
        }

        if self.gateway.tool_timeout_secs == 0 {
            errors.push("Gateway tool_timeout_secs must be at least 1".to_string());
        }

        if self.gateway.channel_capacity == 0 {
            errors.push("Gateway channel_capacity must be at least 1".to_string());
        }

        if self.gateway.keep_alive_secs == 0 {
            errors.push("Gateway keep_alive_secs must be at least 1".to_string());
        }

        if self.server.name.trim().is_empty() {
            errors.push("Server name cannot be empty".to_string());
        }

        match url::Url::parse(&self.maps.api_base) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
                if url.scheme() == "http" {
                    warn!("Maps api_base uses plain http: {}", self.maps.api_base);
                }
            }
            _ => errors.push(format!(
                "Maps api_base must be an http(s) URL, got '{}'",
                self.maps.api_base
            )),
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }
}
