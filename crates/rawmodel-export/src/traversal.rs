//! Scene traversal
//!
//! Walks the selected roots with an explicit work stack and feeds every
//! active node's geometry into a [`GeometryAccumulator`].

use std::fmt;

use rawmodel_core::BoundingBox;
use rawmodel_scene::{SceneNode, Topology};
use serde::Serialize;
use tracing::{debug, warn};

use crate::accumulator::GeometryAccumulator;
use crate::manifest::MeshEntry;
use crate::material::{MaterialDescriptor, MaterialResolver, ReferencedTextures};
use crate::options::NormalTransform;
use crate::vertex::VertexTransform;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Submesh is not a triangle list and was left out
    InvalidTopology { topology: Topology },
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::InvalidTopology { topology } => {
                write!(f, "topology {} is not supported, only triangles", topology)
            }
        }
    }
}

/// A non-fatal problem found while collecting geometry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub object: String,
    pub mesh: String,
    /// Ordinal across all of the object's bindings
    pub submesh: usize,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: mesh '{}' submesh {}: {}",
            self.object, self.mesh, self.submesh, self.kind
        )
    }
}

/// Everything gathered from one traversal
#[derive(Debug, Default)]
pub struct SceneCollection {
    pub geometry: GeometryAccumulator,
    pub meshes: Vec<MeshEntry>,
    pub bounding_box: BoundingBox,
    pub textures: ReferencedTextures,
    pub diagnostics: Vec<Diagnostic>,
    /// Active nodes popped from the work stack
    pub objects_visited: usize,
}

impl SceneCollection {
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

pub struct SceneTraversal {
    normal_transform: NormalTransform,
}

impl SceneTraversal {
    /// Traversal that maps normals with `normal_transform`
    pub fn new(normal_transform: NormalTransform) -> Self {
        Self { normal_transform }
    }

    /// Collect the geometry of `roots` and all their active descendants
    pub fn collect(&self, roots: &[&dyn SceneNode]) -> SceneCollection {
        let mut collection = SceneCollection::default();
        let mut resolver = MaterialResolver::new();

        let mut stack: Vec<&dyn SceneNode> = roots.to_vec();
        while let Some(node) = stack.pop() {
            if !node.active_in_hierarchy() {
                debug!(object = node.name(), "Skipping inactive object");
                continue;
            }
            collection.objects_visited += 1;
            stack.extend(node.children());

            self.collect_node(node, &mut collection, &mut resolver);
        }

        collection.textures = resolver.into_textures();
        collection
    }

    fn collect_node(
        &self,
        node: &dyn SceneNode,
        collection: &mut SceneCollection,
        resolver: &mut MaterialResolver,
    ) {
        let bindings = node.geometry();
        if bindings.is_empty() {
            return;
        }

        let transform = VertexTransform::new(node.world_transform(), self.normal_transform);
        let materials = node.materials();
        // Material slot of the next submesh. Counts every submesh of every
        // binding, including the ones skipped for their topology, so the
        // material list lines up with the node's submeshes and not with the
        // emitted ranges.
        let mut ordinal = 0;

        for binding in &bindings {
            let mesh = binding.mesh;
            collection.bounding_box.encapsulate(&binding.world_bounds);

            let first_ordinal = ordinal;
            ordinal += mesh.submesh_count();

            if !mesh.submeshes.iter().any(|s| s.is_triangle_list()) {
                for (i, submesh) in mesh.submeshes.iter().enumerate() {
                    let diagnostic = invalid_topology(node, &mesh.name, first_ordinal + i, submesh.topology);
                    collection.diagnostics.push(diagnostic);
                }
                continue;
            }

            collection.geometry.reserve(mesh.vertex_count(), mesh.index_count());
            let index_offset = collection.geometry.append_mesh(&transform, mesh);
            debug!(
                object = node.name(),
                mesh = %mesh.name,
                vertices = mesh.vertex_count(),
                index_offset,
                "Appended mesh"
            );

            for (i, submesh) in mesh.submeshes.iter().enumerate() {
                let submesh_ordinal = first_ordinal + i;
                if !submesh.is_triangle_list() {
                    let diagnostic = invalid_topology(node, &mesh.name, submesh_ordinal, submesh.topology);
                    collection.diagnostics.push(diagnostic);
                    continue;
                }

                let range = collection.geometry.append_triangles(&submesh.indices, index_offset);
                let material = match materials.get(submesh_ordinal) {
                    Some(material) => resolver.resolve(material),
                    None => MaterialDescriptor::default(),
                };
                collection.meshes.push(MeshEntry { range, material });
            }
        }
    }
}

fn invalid_topology(node: &dyn SceneNode, mesh: &str, submesh: usize, topology: Topology) -> Diagnostic {
    warn!(
        object = node.name(),
        mesh,
        submesh,
        %topology,
        "Skipping submesh, only triangle lists are exported"
    );
    Diagnostic {
        object: node.name().to_string(),
        mesh: mesh.to_string(),
        submesh,
        kind: DiagnosticKind::InvalidTopology { topology },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rawmodel_core::{Mat4x4, Vec3};
    use rawmodel_scene::{GeometryBinding, Material, Mesh, Submesh};

    struct TestNode {
        name: &'static str,
        active: bool,
        world: Mat4x4,
        meshes: Vec<Mesh>,
        materials: Vec<Material>,
        children: Vec<TestNode>,
    }

    impl TestNode {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                active: true,
                world: Mat4x4::IDENTITY,
                meshes: Vec::new(),
                materials: Vec::new(),
                children: Vec::new(),
            }
        }

        fn with_mesh(mut self, mesh: Mesh) -> Self {
            self.meshes.push(mesh);
            self
        }

        fn with_child(mut self, child: TestNode) -> Self {
            self.children.push(child);
            self
        }
    }

    impl SceneNode for TestNode {
        fn name(&self) -> &str {
            self.name
        }

        fn active_in_hierarchy(&self) -> bool {
            self.active
        }

        fn world_transform(&self) -> Mat4x4 {
            self.world
        }

        fn children(&self) -> Vec<&dyn SceneNode> {
            self.children.iter().map(|c| c as &dyn SceneNode).collect()
        }

        fn geometry(&self) -> Vec<GeometryBinding<'_>> {
            self.meshes
                .iter()
                .map(|mesh| GeometryBinding { mesh, world_bounds: mesh.world_bounds(&self.world) })
                .collect()
        }

        fn materials(&self) -> &[Material] {
            &self.materials
        }
    }

    fn triangle(name: &str, x: f32) -> Mesh {
        let mut mesh = Mesh::new(name);
        mesh.positions = vec![Vec3::new(x, 0.0, 0.0), Vec3::new(x + 1.0, 0.0, 0.0), Vec3::new(x, 1.0, 0.0)];
        mesh.submeshes = vec![Submesh::triangles(vec![0, 1, 2])];
        mesh
    }

    fn collect(roots: &[&dyn SceneNode]) -> SceneCollection {
        SceneTraversal::new(NormalTransform::Forward).collect(roots)
    }

    #[test]
    fn test_roots_pop_last_first() {
        let a = TestNode::new("a").with_mesh(triangle("a", 0.0));
        let b = TestNode::new("b").with_mesh(triangle("b", 10.0));

        let collection = collect(&[&a, &b]);

        // b was pushed last and so contributes the first vertices
        assert_eq!(collection.geometry.vertices()[0].position, [10.0, 0.0, 0.0]);
        assert_eq!(collection.objects_visited, 2);
        assert_eq!(collection.meshes.len(), 2);
    }

    #[test]
    fn test_inactive_subtree_is_skipped() {
        let mut hidden = TestNode::new("hidden")
            .with_mesh(triangle("h", 5.0))
            .with_child(TestNode::new("grandchild").with_mesh(triangle("g", 7.0)));
        hidden.active = false;
        let root = TestNode::new("root").with_mesh(triangle("r", 0.0)).with_child(hidden);

        let collection = collect(&[&root]);

        assert_eq!(collection.objects_visited, 1);
        assert_eq!(collection.geometry.vertex_count(), 3);
        assert_eq!(collection.bounding_box.max, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_missing_materials_fall_back() {
        let mut mesh = triangle("two", 0.0);
        mesh.submeshes.push(Submesh::triangles(vec![2, 1, 0]));
        let mut node = TestNode::new("n").with_mesh(mesh);
        node.materials = vec![Material::new("only")];

        let collection = collect(&[&node]);

        assert_eq!(collection.meshes.len(), 2);
        assert_eq!(collection.meshes[1].material, MaterialDescriptor::default());
        assert_eq!(collection.meshes[1].range.start_index, 3);
    }

    #[test]
    fn test_non_triangle_submesh_keeps_ordinal() {
        let mut mesh = triangle("mixed", 0.0);
        mesh.submeshes.insert(0, Submesh { topology: Topology::Lines, indices: vec![0, 1] });
        let mut node = TestNode::new("n").with_mesh(mesh);
        node.materials = vec![
            Material::new("lines"),
            Material::new("tris").with(
                rawmodel_scene::MaterialSlot::RenderingMode,
                rawmodel_scene::PropertyValue::Float(1.0),
            ),
        ];

        let collection = collect(&[&node]);

        assert_eq!(collection.meshes.len(), 1);
        assert!(collection.meshes[0].material.alpha_testing);
        assert_eq!(collection.diagnostics.len(), 1);
        assert_eq!(collection.diagnostics[0].submesh, 0);
        assert_eq!(
            collection.diagnostics[0].kind,
            DiagnosticKind::InvalidTopology { topology: Topology::Lines }
        );
    }

    #[test]
    fn test_mesh_without_triangles_adds_no_vertices() {
        let mut mesh = triangle("points", 0.0);
        mesh.submeshes = vec![Submesh { topology: Topology::Points, indices: vec![0, 1, 2] }];
        let node = TestNode::new("n").with_mesh(mesh);

        let collection = collect(&[&node]);

        assert_eq!(collection.geometry.vertex_count(), 0);
        assert!(collection.is_empty());
        assert_eq!(collection.diagnostics.len(), 1);
        // bounds still cover the skipped mesh
        assert!(collection.bounding_box.is_valid());
    }

    #[test]
    fn test_inactive_roots_keep_empty_bounds() {
        let mut root = TestNode::new("r").with_mesh(triangle("r", 0.0));
        root.active = false;

        let collection = collect(&[&root]);

        assert_eq!(collection.bounding_box, BoundingBox::EMPTY);
        assert_eq!(collection.objects_visited, 0);
    }
}
