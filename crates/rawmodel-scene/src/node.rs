//! The scene graph interface consumed by the exporter
//!
//! Any host scene graph can be exported by implementing [`SceneNode`]. The
//! exporter only reads through this trait and never mutates the scene.

use rawmodel_core::{BoundingBox, Mat4x4};

use crate::material::Material;
use crate::mesh::Mesh;

/// One piece of geometry attached to a node
#[derive(Debug, Clone, Copy)]
pub struct GeometryBinding<'a> {
    /// Local-space mesh data
    pub mesh: &'a Mesh,
    /// Render bounds in world space
    pub world_bounds: BoundingBox,
}

/// A node of a host scene graph
pub trait SceneNode {
    /// Display name, used in diagnostics
    fn name(&self) -> &str;

    /// False if this node or any ancestor is disabled
    fn active_in_hierarchy(&self) -> bool;

    /// Local-to-world transform
    fn world_transform(&self) -> Mat4x4;

    /// Direct children in declaration order
    fn children(&self) -> Vec<&dyn SceneNode>;

    /// Geometry bindings; empty for non-renderable nodes
    fn geometry(&self) -> Vec<GeometryBinding<'_>>;

    /// Bound materials, indexed by submesh ordinal
    fn materials(&self) -> &[Material];
}

impl std::fmt::Debug for dyn SceneNode + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneNode")
            .field("name", &self.name())
            .field("active", &self.active_in_hierarchy())
            .finish()
    }
}
