//! Scene setup - ground, grid, lights, and theme decorations
//!
//! The environment is rebuilt from a composed [`RenderableScene`] whenever
//! the theme changes or a new model becomes active. Model entities are not
//! touched here.

use bevy::light::{CascadeShadowConfigBuilder, DirectionalLightShadowMap, NotShadowCaster};
use bevy::prelude::*;
use facade_core::{
    compose, star_field, Decoration, LightDefinition, MeshNode, RenderableScene, Rgb, ShadowSettings,
};
use std::sync::Arc;

use crate::types::{ActiveTheme, ComposedScene, SwapControl};

/// Scale from descriptor intensities to Bevy's physical light units
const DIRECTIONAL_LUX: f32 = 10_000.0;
const POINT_LUMENS: f32 = 1_000_000.0;
const AMBIENT_BRIGHTNESS: f32 = 1_000.0;

const GRID_LINE_THICKNESS: f32 = 0.02;

/// Marker for every entity spawned from the composed environment
#[derive(Component)]
pub struct EnvironmentEntity;

/// Marker for grid lines
#[derive(Component)]
pub struct GridLine;

/// Marker for the shadow-casting key light
#[derive(Component)]
pub struct KeyLight;

/// Plugin for scene setup
pub struct SceneSetupPlugin;

impl Plugin for SceneSetupPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ComposedScene>()
            .add_systems(Update, recompose_scene.run_if(environment_stale));
    }
}

/// True on the first frame, on theme changes, and when the active model changes
fn environment_stale(theme: Res<ActiveTheme>, swap: Res<SwapControl>, composed: Res<ComposedScene>) -> bool {
    let Some(scene) = &composed.0 else {
        return true;
    };
    if scene.theme != theme.0 {
        return true;
    }
    match swap.0.active() {
        Some(active) => !Arc::ptr_eq(&active.model, &scene.model),
        None => false,
    }
}

fn recompose_scene(
    mut commands: Commands,
    theme: Res<ActiveTheme>,
    swap: Res<SwapControl>,
    mut composed: ResMut<ComposedScene>,
    existing: Query<Entity, With<EnvironmentEntity>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let model = swap
        .0
        .active()
        .map(|active| active.model.clone())
        .unwrap_or_else(|| Arc::new(MeshNode::group(None)));
    let scene = compose(model, &theme.0.descriptor());

    // Only the model changed: keep the environment entities as they are
    let theme_unchanged = composed.0.as_ref().is_some_and(|previous| previous.theme == scene.theme);
    if !theme_unchanged {
        for entity in &existing {
            commands.entity(entity).despawn();
        }
        spawn_environment(&mut commands, &scene, &mut meshes, &mut materials);
        tracing::info!(theme = %scene.theme, "Environment rebuilt");
    }

    composed.0 = Some(scene);
}

fn color(rgb: Rgb) -> Color {
    Color::srgb(rgb.r(), rgb.g(), rgb.b())
}

fn position(v: facade_core::glam::Vec3) -> Vec3 {
    Vec3::from_array(v.to_array())
}

fn spawn_environment(
    commands: &mut Commands,
    scene: &RenderableScene,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    commands.insert_resource(ClearColor(color(scene.background)));

    // Bevy has no hemisphere light; its ground tint goes into the ambient term
    let mut ambient = scene.background.0;
    let mut ambient_brightness = scene.ambient_intensity * AMBIENT_BRIGHTNESS;
    for light in &scene.lights {
        if let LightDefinition::Hemisphere { ground, intensity, .. } = light {
            for (channel, g) in ambient.iter_mut().zip(ground.0) {
                *channel = (*channel + g) * 0.5;
            }
            ambient_brightness += intensity * AMBIENT_BRIGHTNESS * 0.5;
        }
    }
    commands.insert_resource(AmbientLight {
        color: color(Rgb(ambient)),
        brightness: ambient_brightness,
        ..default()
    });

    for light in &scene.lights {
        spawn_light(commands, light);
    }

    // Ground
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(scene.ground.extent, scene.ground.extent))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: color(scene.ground.color),
            perceptual_roughness: 0.9,
            ..default()
        })),
        Transform::from_xyz(0.0, scene.ground.elevation, 0.0),
        NotShadowCaster,
        EnvironmentEntity,
    ));

    // Grid lines on the X-Z plane
    let grid = &scene.grid;
    let half = grid.extent * 0.5;
    let line_material = materials.add(StandardMaterial {
        base_color: color(grid.color).with_alpha(0.6),
        unlit: true,
        alpha_mode: AlphaMode::Blend,
        ..default()
    });
    let along_x = meshes.add(Cuboid::new(grid.extent, GRID_LINE_THICKNESS, GRID_LINE_THICKNESS));
    let along_z = meshes.add(Cuboid::new(GRID_LINE_THICKNESS, GRID_LINE_THICKNESS, grid.extent));
    for i in 0..=grid.divisions {
        let offset = -half + i as f32 * grid.cell_size();
        commands.spawn((
            Mesh3d(along_x.clone()),
            MeshMaterial3d(line_material.clone()),
            Transform::from_xyz(0.0, grid.elevation, offset),
            NotShadowCaster,
            GridLine,
            EnvironmentEntity,
        ));
        commands.spawn((
            Mesh3d(along_z.clone()),
            MeshMaterial3d(line_material.clone()),
            Transform::from_xyz(offset, grid.elevation, 0.0),
            NotShadowCaster,
            GridLine,
            EnvironmentEntity,
        ));
    }

    for decoration in &scene.decorations {
        spawn_decoration(commands, decoration, meshes, materials);
    }
}

fn spawn_light(commands: &mut Commands, light: &LightDefinition) {
    match light {
        LightDefinition::Directional {
            color: rgb,
            intensity,
            position: pos,
            shadow,
        } => {
            let transform = Transform::from_translation(position(*pos)).looking_at(Vec3::ZERO, Vec3::Y);
            let directional = DirectionalLight {
                color: color(*rgb),
                illuminance: intensity * DIRECTIONAL_LUX,
                shadows_enabled: shadow.is_some(),
                ..default()
            };
            match shadow {
                Some(settings) => {
                    commands.insert_resource(DirectionalLightShadowMap {
                        size: settings.map_size as usize,
                    });
                    commands.spawn((directional, transform, cascade_config(settings), KeyLight, EnvironmentEntity));
                }
                None => {
                    commands.spawn((directional, transform, EnvironmentEntity));
                }
            }
        }
        LightDefinition::Hemisphere { sky, intensity, .. } => {
            // Sky half of the hemisphere light: soft light straight down
            commands.spawn((
                DirectionalLight {
                    color: color(*sky),
                    illuminance: intensity * DIRECTIONAL_LUX * 0.5,
                    shadows_enabled: false,
                    ..default()
                },
                Transform::from_xyz(0.0, 1.0, 0.0).looking_at(Vec3::ZERO, Vec3::Z),
                EnvironmentEntity,
            ));
        }
        LightDefinition::Point {
            color: rgb,
            intensity,
            position: pos,
        } => {
            commands.spawn((
                PointLight {
                    color: color(*rgb),
                    intensity: intensity * POINT_LUMENS,
                    range: 60.0,
                    shadows_enabled: false,
                    ..default()
                },
                Transform::from_translation(position(*pos)),
                EnvironmentEntity,
            ));
        }
    }
}

fn cascade_config(settings: &ShadowSettings) -> bevy::light::CascadeShadowConfig {
    CascadeShadowConfigBuilder {
        num_cascades: 1,
        minimum_distance: settings.near,
        maximum_distance: settings.far,
        first_cascade_far_bound: settings.far,
        overlap_proportion: 0.0,
    }
    .build()
}

fn spawn_decoration(
    commands: &mut Commands,
    decoration: &Decoration,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    match decoration {
        Decoration::Sky { sun_position } => {
            commands.spawn((
                Mesh3d(meshes.add(Sphere::new(5.0).mesh().uv(32, 18))),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: Color::srgb(1.0, 0.95, 0.7),
                    emissive: LinearRgba::rgb(8.0, 7.0, 4.0),
                    unlit: true,
                    ..default()
                })),
                Transform::from_translation(position(*sun_position)),
                NotShadowCaster,
                EnvironmentEntity,
            ));
        }
        Decoration::Stars { count, radius, depth } => {
            let star_mesh = meshes.add(Sphere::new(0.15).mesh().uv(6, 4));
            let star_material = materials.add(StandardMaterial {
                base_color: Color::WHITE,
                unlit: true,
                ..default()
            });
            for star in star_field(*count, *radius, *depth) {
                commands.spawn((
                    Mesh3d(star_mesh.clone()),
                    MeshMaterial3d(star_material.clone()),
                    Transform::from_translation(position(star)),
                    NotShadowCaster,
                    EnvironmentEntity,
                ));
            }
        }
        Decoration::Cloud { position: pos, scale } => {
            let puff = meshes.add(Sphere::new(1.0).mesh().uv(16, 10));
            let material = materials.add(StandardMaterial {
                base_color: Color::srgba(1.0, 1.0, 1.0, 0.85),
                alpha_mode: AlphaMode::Blend,
                perceptual_roughness: 1.0,
                ..default()
            });
            let center = position(*pos);
            // A cloud is a loose cluster of flattened puffs
            for (dx, dy, size) in [(-1.2, 0.0, 0.9), (0.0, 0.3, 1.2), (1.3, 0.0, 0.8)] {
                commands.spawn((
                    Mesh3d(puff.clone()),
                    MeshMaterial3d(material.clone()),
                    Transform::from_translation(center + Vec3::new(dx, dy, 0.0) * *scale)
                        .with_scale(Vec3::new(1.0, 0.6, 1.0) * size * *scale),
                    NotShadowCaster,
                    EnvironmentEntity,
                ));
            }
        }
    }
}
