//! Bevy application setup

use bevy::asset::AssetMetaCheck;
use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_picking::DefaultPickingPlugins;
use facade_core::{Catalog, ConfigError, ModelSwapController, ThemeName, ViewerConfig};
use facade_scene::{ActiveTheme, BuildingCatalog, FacadeScenePlugin, ModelRequests, SwapControl};

use crate::ui::UiPlugin;

/// Keep GPU backend chatter out of the log
const LOG_FILTER: &str = "wgpu=error,naga=warn,bevy_render=warn";

/// Everything the viewer needs to start
#[derive(Debug, Clone)]
pub struct ViewerOptions {
    pub config: ViewerConfig,
    pub catalog: Catalog,
    /// Building id to show first; defaults to the first catalog entry
    pub building: Option<String>,
    pub theme: ThemeName,
    /// Directory (or URL prefix) model files are loaded from
    pub asset_root: String,
    /// `None` leaves logging to an already installed subscriber
    pub log_level: Option<Level>,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        let config = ViewerConfig::default();
        Self {
            catalog: Catalog::builtin(),
            building: None,
            theme: config.theme.initial,
            asset_root: config.models.path.display().to_string(),
            log_level: Some(Level::INFO),
            config,
        }
    }
}

impl ViewerOptions {
    /// Options from a validated config
    pub fn from_config(config: ViewerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            catalog: config.catalog()?,
            theme: config.theme.initial,
            asset_root: config.models.path.display().to_string(),
            config,
            ..Self::default()
        })
    }
}

pub fn run(options: ViewerOptions) {
    let swap = ModelSwapController::new(options.config.framing, options.config.navigation);

    let mut requests = ModelRequests::default();
    // In the browser the catalog arrives asynchronously; the web plugin picks the first building
    if !cfg!(target_arch = "wasm32") {
        let initial = options
            .building
            .clone()
            .or_else(|| options.catalog.first().map(|entry| entry.id.clone()));
        if let Some(id) = initial {
            requests.select(id);
        }
    }

    let plugins = DefaultPlugins
        .set(WindowPlugin {
            primary_window: Some(Window {
                title: "Facade Building Viewer".to_string(),
                canvas: Some("#viewer-canvas".to_string()),
                fit_canvas_to_parent: true,
                prevent_default_event_handling: false,
                ..default()
            }),
            ..default()
        })
        .set(AssetPlugin {
            file_path: options.asset_root.clone(),
            // Model directories carry no .meta files
            meta_check: AssetMetaCheck::Never,
            ..default()
        });
    let plugins = match options.log_level {
        Some(level) => plugins.set(LogPlugin {
            level,
            filter: LOG_FILTER.to_string(),
            ..default()
        }),
        None => plugins.disable::<LogPlugin>(),
    };

    let mut app = App::new();
    app.add_plugins(plugins)
        // Picking must be added before EguiPlugin so it can detect PickingPlugin
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(EguiPlugin::default())
        .insert_resource(BuildingCatalog(options.catalog))
        .insert_resource(ActiveTheme(options.theme))
        .insert_resource(SwapControl(swap))
        .insert_resource(requests)
        .add_plugins(FacadeScenePlugin)
        .add_plugins(UiPlugin);

    #[cfg(target_arch = "wasm32")]
    app.add_plugins(crate::web::WebPlugin);

    app.run();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_options_from_config() {
        let mut config = ViewerConfig::default();
        config.models.path = PathBuf::from("/srv/models");
        config.theme.initial = ThemeName::Day;

        let options = ViewerOptions::from_config(config).unwrap();
        assert_eq!(options.asset_root, "/srv/models");
        assert_eq!(options.theme, ThemeName::Day);
        assert_eq!(options.catalog.len(), 5);
        assert!(options.building.is_none());
    }

    #[test]
    fn test_options_reject_invalid_limits() {
        let mut config = ViewerConfig::default();
        config.navigation.min_distance = 50.0;
        config.navigation.max_distance = 10.0;
        assert!(ViewerOptions::from_config(config).is_err());
    }
}
