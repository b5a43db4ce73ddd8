//! Facade Scene - Shared 3D rendering and UI components
//!
//! Renders what `facade-core` decides: the environment from a composed
//! scene, the building model the swap controller activates, and an orbit
//! camera bounded by the active navigation limits. The viewer binary adds
//! windowing and the sidebar on top of this plugin.

pub mod camera;
pub mod gltf_convert;
pub mod models;
pub mod scene;
pub mod types;
pub mod ui;

use bevy::prelude::*;

/// Plugin that sets up the shared 3D scene components.
///
/// Resources inserted before this plugin (catalog, theme, swap controller)
/// are kept; missing ones fall back to defaults.
pub struct FacadeScenePlugin;

impl Plugin for FacadeScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BuildingCatalog>()
            .init_resource::<ActiveTheme>()
            .init_resource::<SwapControl>()
            .init_resource::<UiLayout>()
            .add_plugins(camera::CameraPlugin)
            .add_plugins(scene::SceneSetupPlugin)
            .add_plugins(models::ModelsPlugin);
    }
}

// Re-export commonly used types
pub use camera::{MainCamera, OrbitCamera};
pub use models::{BuildingModel, PendingModel};
pub use types::*;
