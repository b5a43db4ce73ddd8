//! Application state management

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::fetch::ModelFetcher;
use crate::session::Session;

/// Shared application state
pub struct AppState {
    /// The viewing session driven by the API
    pub session: Arc<Session<ModelFetcher>>,
    /// Configuration
    pub config: Config,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Config) -> Result<Arc<Self>> {
        let catalog = config.viewer.catalog().context("Invalid building catalog")?;
        let fetcher = ModelFetcher::new(&config.viewer.models.path)?;
        info!(
            models = %fetcher.models_dir().display(),
            buildings = catalog.len(),
            "Session created"
        );

        let session = Session::new(
            fetcher,
            catalog,
            config.viewer.framing,
            config.viewer.navigation,
            config.viewer.theme.initial,
        );

        Ok(Arc::new(Self {
            session,
            config,
            started_at: Utc::now(),
        }))
    }
}
