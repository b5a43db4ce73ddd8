//! Camera controls and orbit navigation
//!
//! Y is up. The orbit is parameterized by a pivot, a distance, an azimuth
//! around +Y (measured from +X toward +Z), and a polar angle from +Y. User
//! input moves goal values; the visible camera eases toward them with the
//! configured damping.

use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll, MouseScrollUnit};
use bevy::prelude::*;
use bevy_egui::EguiContexts;
use facade_core::{CameraPose, OrbitLimits};

use crate::types::SwapControl;

/// Pixel-unit scroll deltas are divided by this to match line units
const PIXELS_PER_LINE: f32 = 100.0;

/// Orbit controller state
#[derive(Debug, Clone, Resource)]
pub struct OrbitCamera {
    pub distance: f32,
    pub target_distance: f32,
    pub azimuth: f32,
    pub target_azimuth: f32,
    pub polar: f32,
    pub target_polar: f32,
    pub pivot: Vec3,
    pub target_pivot: Vec3,
    pub sensitivity: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub limits: OrbitLimits,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        let mut camera = Self {
            distance: 1.0,
            target_distance: 1.0,
            azimuth: 0.0,
            target_azimuth: 0.0,
            polar: 0.0,
            target_polar: 0.0,
            pivot: Vec3::ZERO,
            target_pivot: Vec3::ZERO,
            sensitivity: 0.005,
            zoom_speed: 0.1,
            pan_speed: 0.002,
            limits: OrbitLimits::default(),
        };
        camera.apply_pose(&CameraPose::initial(&OrbitLimits::default()));
        camera
    }
}

impl OrbitCamera {
    /// Jump to a framed pose, skipping the easing
    pub fn apply_pose(&mut self, pose: &CameraPose) {
        let pivot = Vec3::from_array(pose.target.to_array());
        let offset = Vec3::from_array(pose.eye.to_array()) - pivot;
        let length = offset.length();

        // The eye sits off the orbit diagonal when the pivot is raised, so the
        // orbit radius is the eye-to-pivot distance rather than pose.distance
        let radius = if length > f32::EPSILON { length } else { pose.distance };
        self.target_distance = self.limits.clamp_distance(radius);
        if length > f32::EPSILON {
            self.target_azimuth = offset.z.atan2(offset.x);
            self.target_polar = self.limits.clamp_polar((offset.y / length).clamp(-1.0, 1.0).acos());
        }
        self.target_pivot = pivot;
        self.snap();
    }

    pub fn set_limits(&mut self, limits: OrbitLimits) {
        self.limits = limits;
        self.target_distance = limits.clamp_distance(self.target_distance);
        self.target_polar = limits.clamp_polar(self.target_polar);
    }

    /// Rotate by a screen-space drag in pixels
    pub fn orbit(&mut self, delta: Vec2) {
        self.target_azimuth += delta.x * self.sensitivity;
        self.target_polar = self
            .limits
            .clamp_polar(self.target_polar - delta.y * self.sensitivity);
    }

    /// Move the pivot by a screen-space drag in pixels; never below ground
    pub fn pan(&mut self, delta: Vec2) {
        let right = Vec3::new(self.azimuth.sin(), 0.0, -self.azimuth.cos());
        let speed = self.distance * self.pan_speed;
        self.target_pivot -= right * delta.x * speed;
        self.target_pivot += Vec3::Y * delta.y * speed;
        self.target_pivot.y = self.target_pivot.y.max(0.0);
    }

    /// Zoom by scroll lines; positive scrolls in
    pub fn zoom(&mut self, lines: f32) {
        let factor = (1.0 - lines * self.zoom_speed).max(0.1);
        self.target_distance = self.limits.clamp_distance(self.target_distance * factor);
    }

    /// Ease current values toward the goals
    pub fn step(&mut self, dt: f32) {
        let t = 1.0 - (-self.limits.damping * 60.0 * dt).exp();
        self.distance += (self.target_distance - self.distance) * t;
        self.azimuth += (self.target_azimuth - self.azimuth) * t;
        self.polar += (self.target_polar - self.polar) * t;
        self.pivot += (self.target_pivot - self.pivot) * t;
    }

    pub fn snap(&mut self) {
        self.distance = self.target_distance;
        self.azimuth = self.target_azimuth;
        self.polar = self.target_polar;
        self.pivot = self.target_pivot;
    }

    pub fn eye(&self) -> Vec3 {
        let ring = self.distance * self.polar.sin();
        self.pivot
            + Vec3::new(
                ring * self.azimuth.cos(),
                self.distance * self.polar.cos(),
                ring * self.azimuth.sin(),
            )
    }
}

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Plugin for camera controls
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<OrbitCamera>()
            .add_systems(Startup, spawn_camera)
            .add_systems(Update, (sync_limits, update_camera).chain());
    }
}

fn spawn_camera(mut commands: Commands, orbit: Res<OrbitCamera>) {
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: 60.0_f32.to_radians(),
            near: 0.1,
            far: 1000.0,
            ..default()
        }),
        Transform::from_translation(orbit.eye()).looking_at(orbit.pivot, Vec3::Y),
        MainCamera,
    ));
}

fn sync_limits(swap: Res<SwapControl>, mut orbit: ResMut<OrbitCamera>) {
    let limits = *swap.0.limits();
    if orbit.limits != limits {
        orbit.set_limits(limits);
    }
}

fn update_camera(
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
    mut orbit: ResMut<OrbitCamera>,
    motion: Res<AccumulatedMouseMotion>,
    scroll: Res<AccumulatedMouseScroll>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    time: Res<Time>,
    mut contexts: EguiContexts,
) {
    // Leave the pointer to egui while it is over a panel
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input() || ctx.is_pointer_over_area())
        .unwrap_or(false);

    if !egui_wants_pointer {
        if mouse_button.pressed(MouseButton::Left) {
            orbit.orbit(motion.delta);
        }
        if mouse_button.pressed(MouseButton::Right) {
            orbit.pan(motion.delta);
        }

        let lines = match scroll.unit {
            MouseScrollUnit::Line => scroll.delta.y,
            MouseScrollUnit::Pixel => scroll.delta.y / PIXELS_PER_LINE,
        };
        if lines != 0.0 {
            orbit.zoom(lines);
        }

        // One finger orbits, two fingers pinch-zoom
        let touches: Vec<_> = touch_input.iter().collect();
        match touches.as_slice() {
            [touch] => orbit.orbit(touch.delta()),
            [a, b] => {
                let current = a.position().distance(b.position());
                let previous = (a.position() - a.delta()).distance(b.position() - b.delta());
                if current > 1.0 && previous > 1.0 {
                    orbit.zoom((current - previous) / PIXELS_PER_LINE);
                }
            }
            _ => {}
        }
    }

    orbit.step(time.delta_secs());

    if let Ok(mut transform) = camera_query.single_mut() {
        transform.translation = orbit.eye();
        transform.look_at(orbit.pivot, Vec3::Y);
    }
}
