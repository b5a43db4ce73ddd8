//! Transforms and axis-aligned bounding volumes

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Tolerance below which an extent counts as zero
pub const EXTENT_EPSILON: f32 = 1e-6;

/// Local transform of a hierarchy node (translation, rotation, scale)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl NodeTransform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Matrix mapping this node's local space into its parent's space
    pub fn compute_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Axis-aligned box; `min <= max` holds component-wise for every value
/// produced by this type's constructors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingVolume {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingVolume {
    /// Box spanning two arbitrary corners
    pub fn from_corners(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Zero-volume box at a single point
    pub fn point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Largest extent over the three axes
    pub fn max_dimension(&self) -> f32 {
        self.size().max_element()
    }

    /// True when there is nothing to frame: every extent is (close to) zero
    /// or the corners are not finite.
    pub fn is_degenerate(&self) -> bool {
        !self.min.is_finite() || !self.max.is_finite() || self.max_dimension() <= EXTENT_EPSILON
    }

    /// Smallest box enclosing both boxes
    pub fn union(&self, other: &BoundingVolume) -> BoundingVolume {
        BoundingVolume {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Grow the box to include a point
    pub fn include_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Axis-aligned box enclosing this box after an affine transform
    pub fn transformed(&self, matrix: &Mat4) -> BoundingVolume {
        let mut corners = self.corners().into_iter().map(|c| matrix.transform_point3(c));
        // corners() always yields eight points
        let first = corners.next().unwrap_or(Vec3::ZERO);
        let mut out = BoundingVolume::point(first);
        for p in corners {
            out.include_point(p);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_orders_components() {
        let b = BoundingVolume::from_corners(Vec3::new(1.0, -2.0, 3.0), Vec3::new(-1.0, 2.0, 0.0));
        assert_eq!(b.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(b.max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_degenerate_detection() {
        assert!(BoundingVolume::point(Vec3::new(4.0, 5.0, 6.0)).is_degenerate());
        assert!(BoundingVolume::point(Vec3::NAN).is_degenerate());
        // A flat box still has something to frame
        let flat = BoundingVolume::from_corners(Vec3::ZERO, Vec3::new(2.0, 0.0, 2.0));
        assert!(!flat.is_degenerate());
    }

    #[test]
    fn test_transformed_rotation_expands_box() {
        let b = BoundingVolume::from_corners(Vec3::splat(-1.0), Vec3::splat(1.0));
        let m = Mat4::from_rotation_y(std::f32::consts::FRAC_PI_4);
        let t = b.transformed(&m);
        let half_diag = 2.0_f32.sqrt();
        assert!((t.max.x - half_diag).abs() < 1e-5);
        assert!((t.min.z + half_diag).abs() < 1e-5);
        assert!((t.max.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_transform_matrix_applies_scale_then_translation() {
        let t = NodeTransform::from_translation(Vec3::new(10.0, 0.0, 0.0)).with_scale(Vec3::splat(2.0));
        let p = t.compute_matrix().transform_point3(Vec3::ONE);
        assert_eq!(p, Vec3::new(12.0, 2.0, 2.0));
    }
}
