//! Configuration loading and validation

use anyhow::{Context, Result};
use facade_core::{Catalog, ViewerConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub daemon: DaemonConfig,
    /// Sections shared with the desktop viewer
    #[serde(flatten)]
    pub viewer: ViewerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Bind address for web server
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Directory holding the browser viewer build
    #[serde(default = "default_web_dir")]
    pub web_dir: PathBuf,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            web_dir: default_web_dir(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_web_dir() -> PathBuf {
    PathBuf::from("web")
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        info!(path = %path.display(), "Configuration file not found, using defaults");
        return Ok(Config::default());
    }

    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    config.viewer.validate().context("Invalid configuration")?;
    info!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

/// Save default configuration to file, with the built-in buildings spelled out
pub fn save_default_config(path: &Path) -> Result<()> {
    let mut config = Config::default();
    config.viewer.building = Catalog::builtin().building;

    let content = toml::to_string_pretty(&config)?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
