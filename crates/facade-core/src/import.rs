//! glTF scene graph import
//!
//! Reads the node tree of a glTF/GLB document into a [`MeshNode`]
//! hierarchy. Only structure is imported: node TRS and the position
//! accessor bounds of each mesh. Vertex data is never decoded, so external
//! buffers need not be present.

use glam::{Quat, Vec3};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::geometry::{BoundingVolume, NodeTransform};
use crate::hierarchy::{Geometry, MeshNode};
use crate::source::LoadError;

/// Deepest node nesting accepted before the document is treated as malformed
const MAX_DEPTH: usize = 256;

/// Build a hierarchy from the default (or first) scene of a glTF document
pub fn hierarchy_from_gltf(asset: &str, bytes: &[u8]) -> Result<MeshNode, LoadError> {
    let gltf = gltf::Gltf::from_slice(bytes).map_err(|e| LoadError::parse(asset, e))?;
    let scene = displayed_scene(&gltf.document).ok_or_else(|| LoadError::parse(asset, "document has no scenes"))?;

    let mut importer = Importer {
        asset,
        geometry: HashMap::new(),
    };
    let mut root = MeshNode::group(scene.name().map(str::to_string));
    for node in scene.nodes() {
        root.children.push(importer.node(&node, 0)?);
    }

    debug!(
        asset,
        nodes = root.node_count(),
        meshes = root.mesh_count(),
        "Imported glTF hierarchy"
    );
    Ok(root)
}

/// The scene that gets shown: the document's default scene, else its first.
///
/// Nodes of any other scene, and nodes outside every scene, are not part of
/// the model.
pub fn displayed_scene(document: &gltf::Document) -> Option<gltf::Scene<'_>> {
    document.default_scene().or_else(|| document.scenes().next())
}

struct Importer<'a> {
    asset: &'a str,
    /// Geometry per glTF mesh index, shared between instancing nodes
    geometry: HashMap<usize, Option<Arc<Geometry>>>,
}

impl Importer<'_> {
    fn node(&mut self, node: &gltf::Node<'_>, depth: usize) -> Result<MeshNode, LoadError> {
        if depth > MAX_DEPTH {
            return Err(LoadError::parse(self.asset, "node hierarchy is too deep"));
        }

        let name = node.name().map(str::to_string);
        let geometry = node.mesh().and_then(|mesh| self.geometry_for(&mesh));
        let mut out = match geometry {
            Some(geometry) => MeshNode::mesh(name, geometry),
            None => MeshNode::group(name),
        };

        let (translation, rotation, scale) = node.transform().decomposed();
        out.transform = NodeTransform {
            translation: Vec3::from_array(translation),
            rotation: Quat::from_array(rotation),
            scale: Vec3::from_array(scale),
        };

        for child in node.children() {
            out.children.push(self.node(&child, depth + 1)?);
        }
        Ok(out)
    }

    fn geometry_for(&mut self, mesh: &gltf::Mesh<'_>) -> Option<Arc<Geometry>> {
        self.geometry
            .entry(mesh.index())
            .or_insert_with(|| {
                let bounds = mesh
                    .primitives()
                    .filter_map(|p| position_bounds(&p))
                    .reduce(|a, b| a.union(&b))?;
                Some(Arc::new(Geometry::new(mesh.name().map(str::to_string), bounds)))
            })
            .clone()
    }
}

/// Bounds from the POSITION accessor's declared min/max
fn position_bounds(primitive: &gltf::Primitive<'_>) -> Option<BoundingVolume> {
    let accessor = primitive.get(&gltf::Semantic::Positions)?;
    let min = vec3_from_json(&accessor.min()?)?;
    let max = vec3_from_json(&accessor.max()?)?;
    Some(BoundingVolume::from_corners(min, max))
}

fn vec3_from_json(value: &serde_json::Value) -> Option<Vec3> {
    let arr = value.as_array()?;
    if arr.len() != 3 {
        return None;
    }
    let mut out = [0.0f32; 3];
    for (slot, v) in out.iter_mut().zip(arr) {
        *slot = v.as_f64()? as f32;
    }
    Some(Vec3::from_array(out))
}
