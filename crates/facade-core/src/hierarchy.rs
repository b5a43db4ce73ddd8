//! Mesh hierarchy types
//!
//! A model is a tree of [`MeshNode`]s. Each node owns its children; mesh
//! nodes additionally hold a shared, read-only reference to the geometry
//! they draw.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::geometry::{BoundingVolume, NodeTransform};

/// Geometry shared read-only with the source asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub name: Option<String>,
    /// Bounds in the geometry's own (mesh-local) space
    pub bounds: BoundingVolume,
}

impl Geometry {
    pub fn new(name: Option<String>, bounds: BoundingVolume) -> Self {
        Self { name, bounds }
    }
}

/// Mesh payload of a node plus its rendering hints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshAttachment {
    pub geometry: Arc<Geometry>,
    #[serde(default)]
    pub cast_shadow: bool,
    #[serde(default)]
    pub receive_shadow: bool,
}

/// What a node is: a pure transform group, or a node carrying geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    Group,
    Mesh(MeshAttachment),
}

impl NodeKind {
    pub fn mesh(geometry: Arc<Geometry>) -> Self {
        NodeKind::Mesh(MeshAttachment {
            geometry,
            cast_shadow: false,
            receive_shadow: false,
        })
    }
}

/// A node in a model hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshNode {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub transform: NodeTransform,
    pub kind: NodeKind,
    #[serde(default)]
    pub children: Vec<MeshNode>,
}

impl MeshNode {
    pub fn group(name: Option<String>) -> Self {
        Self {
            name,
            transform: NodeTransform::IDENTITY,
            kind: NodeKind::Group,
            children: Vec::new(),
        }
    }

    pub fn mesh(name: Option<String>, geometry: Arc<Geometry>) -> Self {
        Self {
            name,
            transform: NodeTransform::IDENTITY,
            kind: NodeKind::mesh(geometry),
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: NodeTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_child(mut self, child: MeshNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn is_mesh(&self) -> bool {
        matches!(self.kind, NodeKind::Mesh(_))
    }

    /// Depth-first, pre-order visit of this node and all descendants
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a MeshNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Mutable pre-order visit of every mesh attachment in the tree
    pub fn for_each_mesh_mut(&mut self, visit: &mut impl FnMut(&mut MeshAttachment)) {
        if let NodeKind::Mesh(mesh) = &mut self.kind {
            visit(mesh);
        }
        for child in &mut self.children {
            child.for_each_mesh_mut(visit);
        }
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }

    pub fn mesh_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |node| {
            if node.is_mesh() {
                count += 1;
            }
        });
        count
    }

    pub fn has_geometry(&self) -> bool {
        self.is_mesh() || self.children.iter().any(MeshNode::has_geometry)
    }
}
