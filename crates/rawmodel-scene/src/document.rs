//! Scene documents
//!
//! A YAML or JSON description of a scene graph, and the resolved in-memory
//! [`Scene`] built from it. This is the host adapter used by the command-line
//! tool and the tests; engines embedding the exporter implement
//! [`SceneNode`] on their own types instead.
//!
//! ```yaml
//! name: Assets/Scenes/Demo.unity
//! meshes:
//!   tri:
//!     positions: [[0, 0, 0], [1, 0, 0], [0, 1, 0]]
//!     submeshes: [{ indices: [0, 1, 2] }]
//! materials:
//!   red: { _Color: [1, 0, 0, 1] }
//! nodes:
//!   - name: Root
//!     translation: [0, 0, 5]
//!     meshes: [tri]
//!     materials: [red]
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use rawmodel_core::{BoundingBox, Error, Mat4x4, Result, ResultExt, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::material::{Material, MaterialSlot, PropertyValue};
use crate::mesh::Mesh;
use crate::node::{GeometryBinding, SceneNode};

/// Serialized scene description
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Source scene identifier written to the manifest header
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub meshes: BTreeMap<String, Mesh>,
    #[serde(default)]
    pub materials: BTreeMap<String, MaterialDocument>,
    #[serde(default)]
    pub nodes: Vec<NodeDocument>,
}

/// Serialized material: shader property name to value
///
/// Properties outside [`MaterialSlot`] are accepted and ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialDocument {
    pub properties: BTreeMap<String, PropertyValue>,
}

/// Serialized scene node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDocument {
    pub name: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub translation: Vec3,
    /// xyzw quaternion
    #[serde(default = "default_rotation")]
    pub rotation: Vec4,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    /// Column-major local matrix; overrides translation/rotation/scale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<[f32; 16]>,
    #[serde(default)]
    pub meshes: Vec<String>,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub children: Vec<NodeDocument>,
}

fn default_active() -> bool {
    true
}

fn default_rotation() -> Vec4 {
    Vec4::IDENTITY
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

impl NodeDocument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: true,
            translation: Vec3::ZERO,
            rotation: Vec4::IDENTITY,
            scale: Vec3::ONE,
            matrix: None,
            meshes: Vec::new(),
            materials: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn local_transform(&self) -> Mat4x4 {
        match &self.matrix {
            Some(flat) => Mat4x4::from_flat(flat),
            None => Mat4x4::from_trs(self.translation, self.rotation, self.scale),
        }
    }
}

impl SceneDocument {
    /// Read a document, choosing the format from the file extension
    ///
    /// `.json` is parsed as JSON; anything else as YAML (which also accepts
    /// JSON input).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading scene document {}", path.display()))?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let document = if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        };
        document.with_context(|| format!("parsing scene document {}", path.display()))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| Error::invalid_data(e.to_string()))
    }
}

/// A resolved scene node
#[derive(Debug, Clone)]
pub struct SceneObject {
    name: String,
    path: String,
    active_self: bool,
    active_in_hierarchy: bool,
    world: Mat4x4,
    meshes: Vec<Arc<Mesh>>,
    world_bounds: Vec<BoundingBox>,
    materials: Vec<Material>,
    children: Vec<SceneObject>,
}

impl SceneObject {
    /// Slash-separated path from the root
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn active_self(&self) -> bool {
        self.active_self
    }

    fn find(&self, query: &str) -> Option<&SceneObject> {
        if self.name == query || self.path == query {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(query))
    }

    fn count(&self) -> usize {
        1 + self.children.iter().map(SceneObject::count).sum::<usize>()
    }
}

impl SceneNode for SceneObject {
    fn name(&self) -> &str {
        &self.name
    }

    fn active_in_hierarchy(&self) -> bool {
        self.active_in_hierarchy
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
            .zip(&self.world_bounds)
            .map(|(mesh, bounds)| GeometryBinding {
                mesh: mesh.as_ref(),
                world_bounds: *bounds,
            })
            .collect()
    }

    fn materials(&self) -> &[Material] {
        &self.materials
    }
}

/// An in-memory scene graph
#[derive(Debug, Clone, Default)]
pub struct Scene {
    name: String,
    roots: Vec<SceneObject>,
}

/// Shared lookup tables while resolving nodes
struct Resolver {
    meshes: HashMap<String, Arc<Mesh>>,
    materials: HashMap<String, Material>,
}

impl Resolver {
    fn resolve_node(
        &self,
        doc: &NodeDocument,
        parent_world: &Mat4x4,
        parent_active: bool,
        parent_path: Option<&str>,
    ) -> Result<SceneObject> {
        let world = parent_world.mul(&doc.local_transform());
        let active_in_hierarchy = parent_active && doc.active;
        let path = match parent_path {
            Some(parent) => format!("{}/{}", parent, doc.name),
            None => doc.name.clone(),
        };

        let meshes = doc
            .meshes
            .iter()
            .map(|name| {
                self.meshes.get(name).cloned().ok_or_else(|| {
                    Error::invalid_data(format!("node '{}' references unknown mesh '{}'", path, name))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let materials = doc
            .materials
            .iter()
            .map(|name| {
                self.materials.get(name).cloned().ok_or_else(|| {
                    Error::invalid_data(format!(
                        "node '{}' references unknown material '{}'",
                        path, name
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let world_bounds = meshes.iter().map(|m| m.world_bounds(&world)).collect();

        let children = doc
            .children
            .iter()
            .map(|child| self.resolve_node(child, &world, active_in_hierarchy, Some(&path)))
            .collect::<Result<Vec<_>>>()?;

        Ok(SceneObject {
            name: doc.name.clone(),
            path,
            active_self: doc.active,
            active_in_hierarchy,
            world,
            meshes,
            world_bounds,
            materials,
            children,
        })
    }
}

impl Scene {
    /// Load and resolve a scene document from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let document = SceneDocument::from_path(path)?;
        let mut scene = Self::from_document(&document)?;
        if scene.name.is_empty() {
            scene.name = path.display().to_string();
        }
        info!(
            scene = %scene.name,
            roots = scene.roots.len(),
            objects = scene.object_count(),
            "Loaded scene"
        );
        Ok(scene)
    }

    /// Resolve names, validate meshes and compose world transforms
    pub fn from_document(document: &SceneDocument) -> Result<Self> {
        let mut meshes = HashMap::with_capacity(document.meshes.len());
        for (name, mesh) in &document.meshes {
            let mut mesh = mesh.clone();
            if mesh.name.is_empty() {
                mesh.name = name.clone();
            }
            mesh.validate()?;
            meshes.insert(name.clone(), Arc::new(mesh));
        }

        let mut materials = HashMap::with_capacity(document.materials.len());
        for (name, doc) in &document.materials {
            let mut material = Material::new(name.clone());
            for (property, value) in &doc.properties {
                match MaterialSlot::from_property_name(property) {
                    Some(slot) => material.set(slot, value.clone()),
                    None => debug!(material = %name, property = %property, "Ignoring unknown material property"),
                }
            }
            materials.insert(name.clone(), material);
        }

        let resolver = Resolver { meshes, materials };
        let roots = document
            .nodes
            .iter()
            .map(|node| resolver.resolve_node(node, &Mat4x4::IDENTITY, true, None))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: document.name.clone(),
            roots,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn roots(&self) -> &[SceneObject] {
        &self.roots
    }

    pub fn object_count(&self) -> usize {
        self.roots.iter().map(SceneObject::count).sum()
    }

    /// Find a node by name or slash-separated path (first match, depth-first)
    pub fn find(&self, query: &str) -> Option<&SceneObject> {
        self.roots.iter().find_map(|root| root.find(query))
    }

    /// Resolve a selection; an empty query list selects every root
    pub fn select(&self, queries: &[String]) -> Result<Vec<&dyn SceneNode>> {
        if queries.is_empty() {
            return Ok(self.roots.iter().map(|r| r as &dyn SceneNode).collect());
        }
        queries
            .iter()
            .map(|query| {
                self.find(query)
                    .map(|obj| obj as &dyn SceneNode)
                    .ok_or_else(|| Error::invalid_data(format!("no scene object named '{}'", query)))
            })
            .collect()
    }
}
