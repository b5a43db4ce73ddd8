//! Bounding volume computation for mesh hierarchies

use glam::{Mat4, Vec3};

use crate::geometry::BoundingVolume;
use crate::hierarchy::{MeshNode, NodeKind};

/// Compute the axis-aligned bounds of every mesh in the hierarchy.
///
/// Each mesh's local bounds are carried through the composed transforms of
/// all its ancestors, the root's own transform included, so the result is
/// expressed in the space the root is placed in. A hierarchy without any
/// geometry yields a zero-volume box at the root's origin; callers treat
/// that as "nothing to frame".
pub fn compute_bounds(root: &MeshNode) -> BoundingVolume {
    let mut acc: Option<BoundingVolume> = None;
    accumulate(root, Mat4::IDENTITY, &mut acc);
    acc.unwrap_or_else(|| BoundingVolume::point(root.transform.translation))
}

fn accumulate(node: &MeshNode, parent: Mat4, acc: &mut Option<BoundingVolume>) {
    let world = parent * node.transform.compute_matrix();

    if let NodeKind::Mesh(mesh) = &node.kind {
        let placed = mesh.geometry.bounds.transformed(&world);
        *acc = Some(match acc.take() {
            Some(existing) => existing.union(&placed),
            None => placed,
        });
    }

    for child in &node.children {
        accumulate(child, world, acc);
    }
}

/// Midpoint of the bounds on the horizontal (X/Z) plane, with Y zeroed
pub fn horizontal_center(bounds: &BoundingVolume) -> Vec3 {
    let center = bounds.center();
    Vec3::new(center.x, 0.0, center.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::NodeTransform;
    use crate::hierarchy::Geometry;
    use glam::Quat;
    use std::sync::Arc;

    fn boxed(min: Vec3, max: Vec3) -> Arc<Geometry> {
        Arc::new(Geometry::new(None, BoundingVolume::from_corners(min, max)))
    }

    #[test]
    fn test_single_mesh_bounds() {
        let root = MeshNode::mesh(None, boxed(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 2.0, 1.0)));
        let b = compute_bounds(&root);
        assert_eq!(b.min, Vec3::new(-1.0, 0.0, -1.0));
        assert_eq!(b.max, Vec3::new(1.0, 2.0, 1.0));
    }

    #[test]
    fn test_ancestor_transforms_compose() {
        // Group moved +10 on X and scaled x2, child moved +1 on Z
        let child = MeshNode::mesh(None, boxed(Vec3::ZERO, Vec3::ONE))
            .with_transform(NodeTransform::from_translation(Vec3::new(0.0, 0.0, 1.0)));
        let root = MeshNode::group(None)
            .with_transform(
                NodeTransform::from_translation(Vec3::new(10.0, 0.0, 0.0)).with_scale(Vec3::splat(2.0)),
            )
            .with_child(child);

        let b = compute_bounds(&root);
        assert!((b.min - Vec3::new(10.0, 0.0, 2.0)).length() < 1e-5);
        assert!((b.max - Vec3::new(12.0, 2.0, 4.0)).length() < 1e-5);
    }

    #[test]
    fn test_union_over_siblings() {
        let root = MeshNode::group(None)
            .with_child(MeshNode::mesh(None, boxed(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(-4.0, 1.0, 1.0))))
            .with_child(
                MeshNode::group(None).with_child(MeshNode::mesh(
                    None,
                    boxed(Vec3::new(3.0, 0.0, -2.0), Vec3::new(4.0, 7.0, -1.0)),
                )),
            );
        let b = compute_bounds(&root);
        assert_eq!(b.min, Vec3::new(-5.0, 0.0, -2.0));
        assert_eq!(b.max, Vec3::new(4.0, 7.0, 1.0));
    }

    #[test]
    fn test_empty_hierarchy_is_zero_volume_at_origin() {
        let root = MeshNode::group(None)
            .with_transform(NodeTransform::from_translation(Vec3::new(3.0, 1.0, -2.0)))
            .with_child(MeshNode::group(None));
        let b = compute_bounds(&root);
        assert_eq!(b.min, b.max);
        assert_eq!(b.min, Vec3::new(3.0, 1.0, -2.0));
        assert!(b.is_degenerate());
    }

    #[test]
    fn test_min_never_exceeds_max_under_rotation_and_mirroring() {
        let mirrored = MeshNode::mesh(None, boxed(Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 6.0, 8.0)))
            .with_transform(
                NodeTransform::IDENTITY
                    .with_rotation(Quat::from_rotation_z(1.1))
                    .with_scale(Vec3::new(-1.0, 2.0, -0.5)),
            );
        let root = MeshNode::group(None)
            .with_transform(NodeTransform::IDENTITY.with_rotation(Quat::from_rotation_x(-0.7)))
            .with_child(mirrored);
        let b = compute_bounds(&root);
        assert!(b.min.cmple(b.max).all());
    }

    #[test]
    fn test_input_is_not_mutated() {
        let root = MeshNode::group(None)
            .with_child(MeshNode::mesh(None, boxed(Vec3::new(2.0, 0.0, 2.0), Vec3::new(4.0, 1.0, 4.0))));
        let before = root.clone();
        let _ = compute_bounds(&root);
        assert_eq!(root, before);
    }
}
