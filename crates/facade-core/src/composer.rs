//! Scene composition
//!
//! Combines a normalized model with the ground, grid, lights, and
//! decorations of a theme. Nothing here depends on the model's size: the
//! ground and grid have fixed extents and decorations sit at fixed spots.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::hierarchy::MeshNode;
use crate::theme::{LightDefinition, Rgb, ThemeDescriptor, ThemeName};

pub const GROUND_EXTENT: f32 = 200.0;
pub const GRID_EXTENT: f32 = 100.0;
pub const GRID_DIVISIONS: u32 = 50;
/// Grid sits just below the ground surface to avoid z-fighting
pub const GRID_ELEVATION: f32 = -0.01;

pub const SUN_POSITION: Vec3 = Vec3::new(100.0, 50.0, 100.0);
pub const STAR_COUNT: u32 = 5000;
pub const STAR_RADIUS: f32 = 100.0;
pub const STAR_DEPTH: f32 = 50.0;

const CLOUD_BANKS: [(Vec3, f32); 4] = [
    (Vec3::new(-40.0, 35.0, -60.0), 8.0),
    (Vec3::new(30.0, 40.0, -70.0), 10.0),
    (Vec3::new(60.0, 30.0, 20.0), 7.0),
    (Vec3::new(-70.0, 38.0, 30.0), 9.0),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundPlane {
    pub extent: f32,
    pub color: Rgb,
    pub elevation: f32,
    pub receive_shadow: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub extent: f32,
    pub divisions: u32,
    pub color: Rgb,
    pub elevation: f32,
}

impl GridSpec {
    pub fn cell_size(&self) -> f32 {
        self.extent / self.divisions.max(1) as f32
    }
}

/// Decorative, model-independent scene elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Decoration {
    Sky { sun_position: Vec3 },
    Stars { count: u32, radius: f32, depth: f32 },
    Cloud { position: Vec3, scale: f32 },
}

/// Everything the render surface needs to draw one frame, apart from the
/// camera pose
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderableScene {
    pub theme: ThemeName,
    pub model: Arc<MeshNode>,
    pub background: Rgb,
    pub ambient_intensity: f32,
    pub ground: GroundPlane,
    pub grid: GridSpec,
    pub lights: Vec<LightDefinition>,
    pub decorations: Vec<Decoration>,
}

/// Assemble a scene description for a normalized model under a theme
pub fn compose(model: Arc<MeshNode>, theme: &ThemeDescriptor) -> RenderableScene {
    RenderableScene {
        theme: theme.name,
        model,
        background: theme.background,
        ambient_intensity: theme.ambient_intensity,
        ground: GroundPlane {
            extent: GROUND_EXTENT,
            color: theme.ground_color,
            elevation: 0.0,
            receive_shadow: true,
        },
        grid: GridSpec {
            extent: GRID_EXTENT,
            divisions: GRID_DIVISIONS,
            color: theme.grid_color,
            elevation: GRID_ELEVATION,
        },
        lights: theme.lights.clone(),
        decorations: decorations_for(theme),
    }
}

fn decorations_for(theme: &ThemeDescriptor) -> Vec<Decoration> {
    let mut decorations = Vec::new();
    if theme.sky {
        decorations.push(Decoration::Sky {
            sun_position: SUN_POSITION,
        });
    }
    if theme.stars {
        decorations.push(Decoration::Stars {
            count: STAR_COUNT,
            radius: STAR_RADIUS,
            depth: STAR_DEPTH,
        });
    }
    if theme.clouds {
        decorations.extend(
            CLOUD_BANKS
                .iter()
                .map(|&(position, scale)| Decoration::Cloud { position, scale }),
        );
    }
    decorations
}

/// Deterministic star positions on the upper half of a spherical shell
/// between `radius` and `radius + depth`
pub fn star_field(count: u32, radius: f32, depth: f32) -> Vec<Vec3> {
    let mut state: u32 = 0x9e37_79b9;
    let mut next = move || {
        // xorshift32
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state as f32 / u32::MAX as f32
    };

    (0..count)
        .map(|_| {
            let azimuth = next() * std::f32::consts::TAU;
            let y = next();
            let ring = (1.0 - y * y).max(0.0).sqrt();
            let r = radius + next() * depth;
            Vec3::new(ring * azimuth.cos(), y, ring * azimuth.sin()) * r
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundingVolume;
    use crate::hierarchy::Geometry;

    fn model(size: f32) -> Arc<MeshNode> {
        Arc::new(MeshNode::mesh(
            None,
            Arc::new(Geometry::new(
                None,
                BoundingVolume::from_corners(Vec3::ZERO, Vec3::splat(size)),
            )),
        ))
    }

    #[test]
    fn test_ground_and_grid_independent_of_model() {
        let theme = ThemeDescriptor::day();
        let small = compose(model(1.0), &theme);
        let large = compose(model(500.0), &theme);
        assert_eq!(small.ground, large.ground);
        assert_eq!(small.grid, large.grid);
        assert_eq!(small.ground.extent, GROUND_EXTENT);
        assert_eq!(small.grid.cell_size(), 2.0);
    }

    #[test]
    fn test_decorations_follow_theme_flags() {
        let day = compose(model(1.0), &ThemeDescriptor::day());
        assert!(day.decorations.iter().any(|d| matches!(d, Decoration::Sky { .. })));
        assert_eq!(
            day.decorations.iter().filter(|d| matches!(d, Decoration::Cloud { .. })).count(),
            CLOUD_BANKS.len()
        );
        assert!(!day.decorations.iter().any(|d| matches!(d, Decoration::Stars { .. })));

        let night = compose(model(1.0), &ThemeDescriptor::night());
        assert_eq!(night.decorations.len(), 1);
        assert!(matches!(night.decorations[0], Decoration::Stars { count: STAR_COUNT, .. }));
    }

    #[test]
    fn test_star_field_is_stable_and_above_ground() {
        let stars = star_field(500, STAR_RADIUS, STAR_DEPTH);
        assert_eq!(stars.len(), 500);
        assert_eq!(stars, star_field(500, STAR_RADIUS, STAR_DEPTH));
        for star in &stars {
            let r = star.length();
            assert!(star.y >= 0.0);
            assert!(r >= STAR_RADIUS - 1e-3 && r <= STAR_RADIUS + STAR_DEPTH + 1e-3, "r = {r}");
        }
    }

    #[test]
    fn test_model_is_shared_not_copied() {
        let m = model(3.0);
        let scene = compose(m.clone(), &ThemeDescriptor::night());
        assert!(Arc::ptr_eq(&scene.model, &m));
        assert_eq!(scene.lights, ThemeDescriptor::night().lights);
    }
}
