//! Loaded glTF asset to mesh hierarchy conversion
//!
//! Walks the node graph Bevy's glTF loader produced and builds the
//! render-agnostic [`MeshNode`] tree the swap controller normalizes and
//! frames. Only the scene that gets spawned contributes, so the offset and
//! framing match what is drawn. Geometry bounds come from the loaded mesh
//! positions.

use bevy::gltf::{Gltf, GltfMesh, GltfNode};
use bevy::prelude::*;
use facade_core::glam;
use facade_core::{displayed_scene, BoundingVolume, Geometry, MeshNode, NodeTransform};
use std::collections::HashMap;
use std::sync::Arc;

/// Deepest node nesting followed before giving up
const MAX_DEPTH: usize = 256;

/// Scene handle and hierarchy of a loaded glTF asset
pub struct LoadedModel {
    pub scene: Handle<Scene>,
    pub root: MeshNode,
}

/// Why a loaded asset could not be turned into a model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertError {
    NoScenes,
    IncompleteGraph,
}

impl ConvertError {
    pub fn message(self) -> &'static str {
        match self {
            ConvertError::NoScenes => "asset has no scenes",
            ConvertError::IncompleteGraph => "incomplete node graph",
        }
    }
}

/// Build the hierarchy of the scene that gets spawned.
///
/// The asset must be loaded with `include_source` so the scene's root nodes
/// can be read from the document; Bevy's `Gltf` does not keep that mapping.
pub fn model_from_loaded_gltf(
    gltf: &Gltf,
    nodes: &Assets<GltfNode>,
    gltf_meshes: &Assets<GltfMesh>,
    meshes: &Assets<Mesh>,
) -> Result<LoadedModel, ConvertError> {
    let source = gltf.source.as_ref().ok_or(ConvertError::IncompleteGraph)?;
    let displayed = displayed_scene(&source.document).ok_or(ConvertError::NoScenes)?;
    let scene = gltf.scenes.get(displayed.index()).cloned().ok_or(ConvertError::NoScenes)?;
    let scene_roots: Vec<usize> = displayed.nodes().map(|node| node.index()).collect();

    let node_indices = gltf
        .nodes
        .iter()
        .map(|handle| nodes.get(handle).map(|node| node.index))
        .collect::<Option<Vec<_>>>()
        .ok_or(ConvertError::IncompleteGraph)?;
    let positions = select_roots(&node_indices, &scene_roots).ok_or(ConvertError::IncompleteGraph)?;

    let mut converter = Converter {
        nodes,
        gltf_meshes,
        meshes,
        geometry: HashMap::new(),
    };
    let mut root = MeshNode::group(displayed.name().map(str::to_string));
    for position in positions {
        root.children
            .push(converter.node(&gltf.nodes[position], 0).ok_or(ConvertError::IncompleteGraph)?);
    }
    Ok(LoadedModel { scene, root })
}

/// Positions in `node_indices` (document node index per loaded node) of each
/// scene root, in scene order
fn select_roots(node_indices: &[usize], scene_roots: &[usize]) -> Option<Vec<usize>> {
    scene_roots
        .iter()
        .map(|root| node_indices.iter().position(|index| index == root))
        .collect()
}

struct Converter<'a> {
    nodes: &'a Assets<GltfNode>,
    gltf_meshes: &'a Assets<GltfMesh>,
    meshes: &'a Assets<Mesh>,
    geometry: HashMap<AssetId<GltfMesh>, Option<Arc<Geometry>>>,
}

impl Converter<'_> {
    fn node(&mut self, handle: &Handle<GltfNode>, depth: usize) -> Option<MeshNode> {
        if depth > MAX_DEPTH {
            return None;
        }
        let nodes = self.nodes;
        let node = nodes.get(handle)?;
        let name = Some(node.name.clone()).filter(|n| !n.is_empty());
        let geometry = match &node.mesh {
            Some(mesh) => self.geometry_for(mesh),
            None => None,
        };

        let mut out = match geometry {
            Some(geometry) => MeshNode::mesh(name, geometry),
            None => MeshNode::group(name),
        };
        out.transform = NodeTransform {
            translation: glam::Vec3::from_array(node.transform.translation.to_array()),
            rotation: glam::Quat::from_array(node.transform.rotation.to_array()),
            scale: glam::Vec3::from_array(node.transform.scale.to_array()),
        };

        for child in &node.children {
            out.children.push(self.node(child, depth + 1)?);
        }
        Some(out)
    }

    fn geometry_for(&mut self, handle: &Handle<GltfMesh>) -> Option<Arc<Geometry>> {
        if let Some(cached) = self.geometry.get(&handle.id()) {
            return cached.clone();
        }
        let meshes = self.meshes;
        let gltf_mesh = self.gltf_meshes.get(handle)?;
        let bounds = gltf_mesh
            .primitives
            .iter()
            .filter_map(|primitive| meshes.get(&primitive.mesh))
            .filter_map(|mesh| mesh.attribute(Mesh::ATTRIBUTE_POSITION)?.as_float3())
            .filter_map(positions_bounds)
            .reduce(|a, b| a.union(&b));
        let geometry = bounds.map(|bounds| {
            let name = Some(gltf_mesh.name.clone()).filter(|n| !n.is_empty());
            Arc::new(Geometry::new(name, bounds))
        });
        self.geometry.insert(handle.id(), geometry.clone());
        geometry
    }
}

/// Axis-aligned bounds of a position list
pub fn positions_bounds(positions: &[[f32; 3]]) -> Option<BoundingVolume> {
    let (first, rest) = positions.split_first()?;
    let mut bounds = BoundingVolume::point(glam::Vec3::from_array(*first));
    for p in rest {
        bounds.include_point(glam::Vec3::from_array(*p));
    }
    Some(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_bounds() {
        let b = positions_bounds(&[[1.0, 2.0, 3.0], [-1.0, 5.0, 0.0], [0.5, 0.0, 4.0]]).unwrap();
        assert_eq!(b.min, glam::Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(b.max, glam::Vec3::new(1.0, 5.0, 4.0));
        assert!(positions_bounds(&[]).is_none());
    }

    #[test]
    fn test_roots_follow_displayed_scene() {
        // Loaded in an arbitrary order; the displayed scene holds nodes 3 and 0
        let loaded = [2, 0, 1, 3];
        assert_eq!(select_roots(&loaded, &[3, 0]), Some(vec![3, 1]));
        assert_eq!(select_roots(&loaded, &[]), Some(vec![]));
        assert_eq!(select_roots(&loaded, &[7]), None);
    }
}
