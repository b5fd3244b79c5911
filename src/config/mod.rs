//! Configuration management for incubadmin.
//!
//! This module handles loading, saving, and validating the user configuration:
//! application settings plus the list of administrable entity tables.

mod entity;
mod settings;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub use entity::{default_entities, ColumnConfig, EntityConfig};
pub use settings::{Settings, DEFAULT_BASE_URL};

/// Name of the configuration directory.
const APP_DIR: &str = "incubadmin";

/// Name of the configuration file.
const CONFIG_FILE: &str = "config.toml";

/// Errors that can occur while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform configuration directory could not be determined.
    #[error("Could not determine configuration directory")]
    NoConfigDir,

    /// The configuration directory could not be created.
    #[error("Failed to create configuration directory: {0}")]
    CreateDirError(std::io::Error),

    /// The configuration file could not be read.
    #[error("Failed to read configuration file: {0}")]
    ReadError(std::io::Error),

    /// The configuration file could not be written.
    #[error("Failed to write configuration file: {0}")]
    WriteError(std::io::Error),

    /// The configuration file is not valid TOML for this schema.
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("Failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// The configuration parsed but is semantically invalid.
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// The requested entity is not configured.
    #[error("Entity '{0}' not found")]
    EntityNotFound(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// The full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Application-wide settings.
    #[serde(default)]
    pub settings: Settings,
    /// Administrable entities, in picker order.
    #[serde(default = "default_entities")]
    pub entities: Vec<EntityConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            entities: default_entities(),
        }
    }
}

impl Config {
    /// The default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load the configuration from the default path.
    ///
    /// A missing file yields the default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load and validate the configuration at `path`.
    ///
    /// A missing file yields the default configuration.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;

        info!(path = %path.display(), entities = config.entities.len(), "Configuration loaded");
        Ok(config)
    }

    /// Write the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::CreateDirError)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).map_err(ConfigError::WriteError)?;

        info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Validate settings and every entity.
    pub fn validate(&self) -> Result<()> {
        let url = self.settings.base_url.trim();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "base_url '{}' must start with http:// or https://",
                self.settings.base_url
            )));
        }

        if self.entities.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one entity must be configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for entity in &self.entities {
            entity.validate()?;
            if !seen.insert(entity.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate entity name '{}'",
                    entity.name
                )));
            }
        }

        if let Some(name) = &self.settings.default_entity {
            if self.entity(name).is_none() {
                return Err(ConfigError::ValidationError(format!(
                    "default_entity '{}' is not configured",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Find an entity by name.
    pub fn entity(&self, name: &str) -> Option<&EntityConfig> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// The entity to show first: the configured default, else the first one.
    pub fn default_entity(&self) -> Option<&EntityConfig> {
        self.settings
            .default_entity
            .as_deref()
            .and_then(|name| self.entity(name))
            .or_else(|| self.entities.first())
    }
}
