//! Viewer configuration shared by the desktop viewer and the daemon

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::catalog::{BuildingEntry, Catalog, CatalogError};
use crate::framing::{FramingConfig, OrbitLimits};
use crate::theme::ThemeName;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error("Invalid [{section}] config: {reason}")]
    Invalid { section: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub framing: FramingConfig,
    #[serde(default)]
    pub navigation: OrbitLimits,
    #[serde(default)]
    pub theme: ThemeConfig,
    /// Building list; empty means the built-in catalog
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub building: Vec<BuildingEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Directory model files are resolved against
    #[serde(default = "default_models_path")]
    pub path: PathBuf,
}

fn default_models_path() -> PathBuf {
    PathBuf::from("./output")
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            path: default_models_path(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeConfig {
    #[serde(default)]
    pub initial: ThemeName,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            models: ModelsConfig::default(),
            framing: FramingConfig::default(),
            navigation: OrbitLimits::default(),
            theme: ThemeConfig::default(),
            building: Vec::new(),
        }
    }
}

impl ViewerConfig {
    /// Parse and validate a config from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, returning defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        info!(path = %path.display(), buildings = config.building.len(), "Loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.framing
            .check()
            .map_err(|reason| ConfigError::Invalid { section: "framing", reason })?;
        self.navigation
            .check()
            .map_err(|reason| ConfigError::Invalid { section: "navigation", reason })?;
        self.catalog()?;
        Ok(())
    }

    pub fn catalog(&self) -> Result<Catalog, CatalogError> {
        Catalog::from_entries(self.building.clone())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
