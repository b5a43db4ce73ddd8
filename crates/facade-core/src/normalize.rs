//! Horizontal re-centering of model hierarchies
//!
//! Models are assumed to be authored with their ground contact at y = 0, so
//! only the X and Z axes are re-centered. The vertical placement is never
//! inferred from the bounds.

use glam::Vec3;

use crate::bounds::{compute_bounds, horizontal_center};
use crate::geometry::{BoundingVolume, NodeTransform};
use crate::hierarchy::MeshNode;

/// Result of normalizing a source hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedModel {
    /// Centered hierarchy: a new root group holding a copy of the source
    pub root: MeshNode,
    /// Bounds of the untranslated source
    pub source_bounds: BoundingVolume,
    /// Bounds after centering
    pub bounds: BoundingVolume,
    /// Translation applied at the new root, always `(-cx, 0, -cz)`
    pub offset: Vec3,
}

/// Re-center a hierarchy on the X/Z plane, see [`normalize_model`].
pub fn normalize(root: &MeshNode) -> MeshNode {
    normalize_model(root).root
}

/// Re-center a hierarchy on the X/Z plane and enable shadows on its meshes.
///
/// The source is copied (geometry stays shared) and wrapped in a new group
/// translated by the negated horizontal center of the source bounds. The
/// copied descendants keep their transforms. Always normalize from the
/// untranslated source; the output is not meant to be fed back in.
pub fn normalize_model(source: &MeshNode) -> NormalizedModel {
    let source_bounds = compute_bounds(source);
    let offset = -horizontal_center(&source_bounds);

    let mut copy = source.clone();
    copy.for_each_mesh_mut(&mut |mesh| {
        mesh.cast_shadow = true;
        mesh.receive_shadow = true;
    });

    let root = MeshNode::group(Some(normalized_root_name(source)))
        .with_transform(NodeTransform::from_translation(offset))
        .with_child(copy);

    let bounds = BoundingVolume {
        min: source_bounds.min + offset,
        max: source_bounds.max + offset,
    };

    NormalizedModel {
        root,
        source_bounds,
        bounds,
        offset,
    }
}

fn normalized_root_name(source: &MeshNode) -> String {
    match &source.name {
        Some(name) => format!("{name}#centered"),
        None => "centered".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{Geometry, NodeKind};
    use std::sync::Arc;

    fn offset_building() -> MeshNode {
        let walls = Arc::new(Geometry::new(
            Some("walls".to_string()),
            BoundingVolume::from_corners(Vec3::new(20.0, 0.0, -8.0), Vec3::new(30.0, 7.0, 0.0)),
        ));
        let roof = Arc::new(Geometry::new(
            Some("roof".to_string()),
            BoundingVolume::from_corners(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 0.5, 1.0)),
        ));
        MeshNode::group(Some("building".to_string()))
            .with_child(MeshNode::mesh(Some("walls".to_string()), walls))
            .with_child(
                MeshNode::mesh(Some("roof".to_string()), roof)
                    .with_transform(NodeTransform::from_translation(Vec3::new(25.0, 7.0, -4.0))),
            )
    }

    #[test]
    fn test_horizontal_center_moves_to_origin() {
        let source = offset_building();
        let before = compute_bounds(&source);
        let after = compute_bounds(&normalize(&source));

        let c = after.center();
        assert!(c.x.abs() < 1e-4, "x midpoint {}", c.x);
        assert!(c.z.abs() < 1e-4, "z midpoint {}", c.z);
        assert!((c.y - before.center().y).abs() < 1e-5);
        assert!((after.size() - before.size()).length() < 1e-4);
    }

    #[test]
    fn test_already_centered_cube_is_unchanged() {
        let cube = Arc::new(Geometry::new(
            None,
            BoundingVolume::from_corners(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 2.0, 1.0)),
        ));
        let result = normalize_model(&MeshNode::mesh(None, cube));
        assert_eq!(result.offset, Vec3::ZERO);
        assert_eq!(result.bounds.min, Vec3::new(-1.0, 0.0, -1.0));
        assert_eq!(result.bounds.max, Vec3::new(1.0, 2.0, 1.0));
        assert_eq!(compute_bounds(&result.root), result.bounds);
    }

    #[test]
    fn test_translation_applied_once_at_new_root() {
        let source = offset_building();
        let result = normalize_model(&source);

        assert_eq!(result.root.transform.translation, result.offset);
        assert_eq!(result.offset.y, 0.0);
        // Descendants are copied verbatim apart from shadow hints
        let copied = &result.root.children[0];
        assert_eq!(copied.transform, source.transform);
        assert_eq!(copied.children[1].transform, source.children[1].transform);
    }

    #[test]
    fn test_shadow_flags_enabled_on_every_mesh() {
        let result = normalize(&offset_building());
        let mut meshes = 0;
        result.walk(&mut |node| {
            if let NodeKind::Mesh(mesh) = &node.kind {
                meshes += 1;
                assert!(mesh.cast_shadow && mesh.receive_shadow);
            }
        });
        assert_eq!(meshes, 2);
    }

    #[test]
    fn test_source_is_untouched() {
        let source = offset_building();
        let before = source.clone();
        let _ = normalize(&source);
        assert_eq!(source, before);
    }

    #[test]
    fn test_vertical_offset_never_applied() {
        let floating = Arc::new(Geometry::new(
            None,
            BoundingVolume::from_corners(Vec3::new(4.0, 12.0, 4.0), Vec3::new(6.0, 15.0, 6.0)),
        ));
        let result = normalize_model(&MeshNode::mesh(None, floating));
        assert_eq!(result.bounds.min.y, 12.0);
        assert_eq!(result.offset, Vec3::new(-5.0, 0.0, -5.0));
    }
}
