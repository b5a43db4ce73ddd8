//! Shared resources for model selection, theme, and UI layout

use bevy::prelude::*;
use facade_core::{BuildingEntry, Catalog, ModelSwapController, RenderableScene, ThemeName};

/// Buildings the user can pick from
#[derive(Debug, Clone, Resource, Default)]
pub struct BuildingCatalog(pub Catalog);

/// Currently selected theme; changing it recomposes the environment
#[derive(Debug, Clone, Copy, Resource, Default, PartialEq, Eq)]
pub struct ActiveTheme(pub ThemeName);

/// Owner of the active model. Only the model systems mutate it.
#[derive(Debug, Resource, Default)]
pub struct SwapControl(pub ModelSwapController);

/// Requests from the UI, consumed by the model systems once per frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelRequest {
    /// Load a building by catalog id
    Select(String),
    /// Reload the building whose last load failed
    Retry,
}

#[derive(Debug, Clone, Resource, Default)]
pub struct ModelRequests {
    pub queue: Vec<ModelRequest>,
}

impl ModelRequests {
    pub fn select(&mut self, id: impl Into<String>) {
        self.queue.push(ModelRequest::Select(id.into()));
    }

    pub fn retry(&mut self) {
        self.queue.push(ModelRequest::Retry);
    }
}

/// Building ids involved in the current swap, for the sidebar and info panel
#[derive(Debug, Clone, Resource, Default)]
pub struct BuildingSelection {
    /// Building whose load was most recently requested
    pub requested: Option<String>,
    /// Building currently on screen
    pub displayed: Option<BuildingEntry>,
}

/// Last composed scene description (environment plus active model)
#[derive(Debug, Clone, Resource, Default)]
pub struct ComposedScene(pub Option<RenderableScene>);

/// Panel visibility and sizing
#[derive(Debug, Clone, Resource)]
pub struct UiLayout {
    pub show_left_panel: bool,
    pub show_info: bool,
    pub screen_width: f32,
    pub screen_height: f32,
    pub is_mobile: bool,
}

impl Default for UiLayout {
    fn default() -> Self {
        Self {
            show_left_panel: true,
            show_info: true,
            screen_width: 1920.0,
            screen_height: 1080.0,
            is_mobile: false,
        }
    }
}

impl UiLayout {
    /// Update layout based on screen dimensions
    pub fn update_for_screen(&mut self, width: f32, height: f32) {
        self.screen_width = width;
        self.screen_height = height;

        let was_mobile = self.is_mobile;
        self.is_mobile = width < 800.0 || (width < height && width < 600.0);

        // Collapse the sidebar the first time we notice a small screen
        if self.is_mobile && !was_mobile {
            self.show_left_panel = false;
        }
    }

    pub fn panel_width(&self) -> f32 {
        if self.is_mobile {
            (self.screen_width * 0.45).min(200.0)
        } else {
            260.0
        }
    }
}
