//! Facade Core - Model normalization, framing, and swap state
//!
//! This crate provides the render-agnostic core of the Facade building viewer:
//! - Mesh hierarchy types and bounding volume computation
//! - Horizontal re-centering of models about the world origin
//! - Auto-framing of an orbit camera from model bounds
//! - Day/night themes and scene composition
//! - The model swap state machine that owns the active model
//! - Building catalog, configuration, and glTF hierarchy import

pub mod bounds;
pub mod catalog;
pub mod composer;
pub mod config;
pub mod framing;
pub mod geometry;
pub mod hierarchy;
pub mod import;
pub mod normalize;
pub mod source;
pub mod swap;
pub mod theme;

pub use glam;

pub use bounds::{compute_bounds, horizontal_center};
pub use catalog::{BuildingEntry, Catalog, CatalogError};
pub use composer::{compose, star_field, Decoration, GridSpec, GroundPlane, RenderableScene};
pub use config::{ConfigError, ModelsConfig, ThemeConfig, ViewerConfig};
pub use framing::{frame_camera, CameraPose, FramingConfig, OrbitLimits};
pub use geometry::{BoundingVolume, NodeTransform};
pub use hierarchy::{Geometry, MeshAttachment, MeshNode, NodeKind};
pub use import::{displayed_scene, hierarchy_from_gltf};
pub use normalize::{normalize, normalize_model, NormalizedModel};
pub use source::{AssetSource, LoadError};
pub use swap::{
    ActiveModelState, ActiveModelSummary, LoadTicket, ModelSwapController, SwapEvent, SwapOutcome, SwapPhase,
    SwapSnapshot,
};
pub use theme::{LightDefinition, Rgb, ShadowSettings, ThemeDescriptor, ThemeName};
