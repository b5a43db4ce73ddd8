//! Camera auto-framing
//!
//! Derives an orbit camera pose from model bounds so the whole model is in
//! view with margin. The camera always sits on the same three-quarter
//! diagonal, `(d, d * elevation_ratio, d)`, looking at half the model height
//! above the origin.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use crate::geometry::BoundingVolume;

/// Multiplier applied to the largest model dimension
pub const DEFAULT_MARGIN_FACTOR: f32 = 1.5;

/// Eye height as a fraction of the orbit distance
pub const DEFAULT_ELEVATION_RATIO: f32 = 0.7;

/// Dimension substituted when the bounds have nothing to frame
pub const FALLBACK_DIMENSION: f32 = 10.0;

/// Limits enforced by the orbit navigation controller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitLimits {
    #[serde(default = "default_min_distance")]
    pub min_distance: f32,
    #[serde(default = "default_max_distance")]
    pub max_distance: f32,
    /// Polar angle measured from straight up, in radians
    #[serde(default)]
    pub min_polar_angle: f32,
    #[serde(default = "default_max_polar_angle")]
    pub max_polar_angle: f32,
    /// Fraction of the remaining motion applied per frame (orbit damping)
    #[serde(default = "default_damping")]
    pub damping: f32,
}

fn default_min_distance() -> f32 {
    5.0
}

fn default_max_distance() -> f32 {
    100.0
}

fn default_max_polar_angle() -> f32 {
    PI
}

fn default_damping() -> f32 {
    0.05
}

impl Default for OrbitLimits {
    fn default() -> Self {
        Self {
            min_distance: default_min_distance(),
            max_distance: default_max_distance(),
            min_polar_angle: 0.0,
            max_polar_angle: default_max_polar_angle(),
            damping: default_damping(),
        }
    }
}

impl OrbitLimits {
    // max/min rather than f32::clamp, which panics on unchecked limits
    pub fn clamp_distance(&self, distance: f32) -> f32 {
        distance.max(self.min_distance).min(self.max_distance)
    }

    pub fn clamp_polar(&self, polar: f32) -> f32 {
        polar.max(self.min_polar_angle).min(self.max_polar_angle)
    }

    /// Describe the first violated constraint, if any
    pub fn check(&self) -> Result<(), String> {
        let fields = [
            ("min_distance", self.min_distance),
            ("max_distance", self.max_distance),
            ("min_polar_angle", self.min_polar_angle),
            ("max_polar_angle", self.max_polar_angle),
            ("damping", self.damping),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(format!("{} must be finite, got {}", name, value));
        }
        if !(self.min_distance > 0.0) {
            return Err(format!("min_distance must be positive, got {}", self.min_distance));
        }
        if self.max_distance < self.min_distance {
            return Err(format!(
                "max_distance ({}) is below min_distance ({})",
                self.max_distance, self.min_distance
            ));
        }
        if self.min_polar_angle < 0.0 || self.max_polar_angle > PI + 1e-4 {
            return Err("polar angles must lie within [0, pi]".to_string());
        }
        if self.max_polar_angle < self.min_polar_angle {
            return Err("max_polar_angle is below min_polar_angle".to_string());
        }
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(format!("damping must lie within [0, 1], got {}", self.damping));
        }
        Ok(())
    }
}

/// Tunables of the framing policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FramingConfig {
    #[serde(default = "default_margin_factor")]
    pub margin_factor: f32,
    #[serde(default = "default_elevation_ratio")]
    pub elevation_ratio: f32,
    #[serde(default = "default_fallback_dimension")]
    pub fallback_dimension: f32,
}

fn default_margin_factor() -> f32 {
    DEFAULT_MARGIN_FACTOR
}

fn default_elevation_ratio() -> f32 {
    DEFAULT_ELEVATION_RATIO
}

fn default_fallback_dimension() -> f32 {
    FALLBACK_DIMENSION
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            margin_factor: DEFAULT_MARGIN_FACTOR,
            elevation_ratio: DEFAULT_ELEVATION_RATIO,
            fallback_dimension: FALLBACK_DIMENSION,
        }
    }
}

impl FramingConfig {
    pub fn check(&self) -> Result<(), String> {
        let fields = [
            ("margin_factor", self.margin_factor),
            ("elevation_ratio", self.elevation_ratio),
            ("fallback_dimension", self.fallback_dimension),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(format!("{} must be finite, got {}", name, value));
        }
        if !(self.margin_factor > 0.0) {
            return Err(format!("margin_factor must be positive, got {}", self.margin_factor));
        }
        if !(self.fallback_dimension > 0.0) || !self.fallback_dimension.is_finite() {
            return Err(format!(
                "fallback_dimension must be positive and finite, got {}",
                self.fallback_dimension
            ));
        }
        if !(self.elevation_ratio >= 0.0) {
            return Err(format!("elevation_ratio must not be negative, got {}", self.elevation_ratio));
        }
        Ok(())
    }
}

/// Camera placement for an orbit controller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub eye: Vec3,
    pub target: Vec3,
    /// Orbit distance; strictly positive
    pub distance: f32,
}

impl CameraPose {
    /// Pose used before any model has been framed
    pub fn initial(limits: &OrbitLimits) -> Self {
        frame_camera(&BoundingVolume::point(Vec3::ZERO), &FramingConfig::default(), limits)
    }
}

/// Frame the given bounds.
///
/// `distance = clamp(max_dimension * margin_factor, min, max)`; bounds with
/// nothing to frame use `fallback_dimension` in place of the largest
/// dimension, so the distance is always positive and finite.
pub fn frame_camera(bounds: &BoundingVolume, config: &FramingConfig, limits: &OrbitLimits) -> CameraPose {
    let (size, max_dim) = if bounds.is_degenerate() {
        (Vec3::ZERO, config.fallback_dimension)
    } else {
        (bounds.size(), bounds.max_dimension())
    };

    let distance = limits.clamp_distance(max_dim * config.margin_factor);
    let eye = Vec3::new(distance, distance * config.elevation_ratio, distance);
    let target = Vec3::new(0.0, (size.y * 0.5).max(0.0), 0.0);

    CameraPose { eye, target, distance }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loose_limits() -> OrbitLimits {
        OrbitLimits {
            min_distance: 0.5,
            max_distance: 500.0,
            ..OrbitLimits::default()
        }
    }

    #[test]
    fn test_reference_cube_framing() {
        let cube = BoundingVolume::from_corners(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 2.0, 1.0));
        let pose = frame_camera(&cube, &FramingConfig::default(), &loose_limits());
        assert!((pose.distance - 3.0).abs() < 1e-6);
        assert!((pose.eye - Vec3::new(3.0, 2.1, 3.0)).length() < 1e-5);
        assert_eq!(pose.target, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_distance_is_clamped_not_rejected() {
        let limits = OrbitLimits::default();
        let tiny = BoundingVolume::from_corners(Vec3::ZERO, Vec3::splat(0.1));
        assert_eq!(frame_camera(&tiny, &FramingConfig::default(), &limits).distance, 5.0);

        let city = BoundingVolume::from_corners(Vec3::new(-200.0, 0.0, -50.0), Vec3::new(200.0, 30.0, 50.0));
        let pose = frame_camera(&city, &FramingConfig::default(), &limits);
        assert_eq!(pose.distance, 100.0);
        assert_eq!(pose.eye, Vec3::new(100.0, 70.0, 100.0));
    }

    #[test]
    fn test_distance_formula_over_many_sizes() {
        let limits = OrbitLimits::default();
        let config = FramingConfig::default();
        for i in 1..200 {
            let d = i as f32 * 0.75;
            let b = BoundingVolume::from_corners(Vec3::ZERO, Vec3::new(d * 0.5, d, d * 0.25));
            let pose = frame_camera(&b, &config, &limits);
            let expected = (d * config.margin_factor).clamp(limits.min_distance, limits.max_distance);
            assert!((pose.distance - expected).abs() < 1e-4, "d = {d}");
        }
    }

    #[test]
    fn test_degenerate_bounds_use_fallback() {
        let pose = frame_camera(
            &BoundingVolume::point(Vec3::new(7.0, 3.0, 1.0)),
            &FramingConfig::default(),
            &loose_limits(),
        );
        assert!(pose.distance.is_finite());
        assert_eq!(pose.distance, FALLBACK_DIMENSION * DEFAULT_MARGIN_FACTOR);
        assert_eq!(pose.target, Vec3::ZERO);

        let nan = BoundingVolume { min: Vec3::NAN, max: Vec3::NAN };
        let pose = frame_camera(&nan, &FramingConfig::default(), &loose_limits());
        assert!(pose.distance > 0.0 && pose.distance.is_finite());
        assert!(pose.eye.is_finite());
    }

    #[test]
    fn test_target_never_below_ground() {
        let sunken = BoundingVolume::from_corners(Vec3::new(-1.0, -5.0, -1.0), Vec3::new(1.0, -3.0, 1.0));
        let pose = frame_camera(&sunken, &FramingConfig::default(), &loose_limits());
        assert!(pose.target.y >= 0.0);
    }

    #[test]
    fn test_limit_checks() {
        assert!(OrbitLimits::default().check().is_ok());
        let inverted = OrbitLimits {
            min_distance: 50.0,
            max_distance: 10.0,
            ..OrbitLimits::default()
        };
        assert!(inverted.check().is_err());
        let zero_margin = FramingConfig {
            margin_factor: 0.0,
            ..FramingConfig::default()
        };
        assert!(zero_margin.check().is_err());
    }

    #[test]
    fn test_non_finite_limits_rejected() {
        let nan_max = OrbitLimits {
            max_distance: f32::NAN,
            ..OrbitLimits::default()
        };
        assert!(nan_max.check().unwrap_err().contains("max_distance"));
        let nan_polar = OrbitLimits {
            max_polar_angle: f32::NAN,
            ..OrbitLimits::default()
        };
        assert!(nan_polar.check().is_err());
        let steep = FramingConfig {
            elevation_ratio: f32::INFINITY,
            ..FramingConfig::default()
        };
        assert!(steep.check().unwrap_err().contains("elevation_ratio"));
    }

    #[test]
    fn test_unchecked_limits_do_not_panic() {
        let broken = OrbitLimits {
            min_distance: 50.0,
            max_distance: f32::NAN,
            ..OrbitLimits::default()
        };
        let cube = BoundingVolume::from_corners(Vec3::ZERO, Vec3::splat(2.0));
        let pose = frame_camera(&cube, &FramingConfig::default(), &broken);
        assert_eq!(pose.distance, 50.0);
        assert_eq!(broken.clamp_polar(1.0), 1.0);
    }
}
