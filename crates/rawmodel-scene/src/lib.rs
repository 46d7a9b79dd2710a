//! rawmodel-scene
//!
//! The read-only input side of the exporter: the [`SceneNode`] interface a
//! host scene graph implements, the mesh and material model it exposes, and
//! an in-memory scene graph loaded from YAML or JSON scene documents.
//!
//! # Example
//!
//! ```rust,ignore
//! use rawmodel_scene::{Scene, SceneNode};
//!
//! let scene = Scene::load("demo.yaml")?;
//! for root in scene.roots() {
//!     println!("{} ({} children)", root.name(), root.children().len());
//! }
//! ```

pub mod document;
pub mod material;
pub mod mesh;
pub mod node;

pub use document::{MaterialDocument, NodeDocument, Scene, SceneDocument, SceneObject};
pub use material::{Material, MaterialSlot, PropertyValue, TextureRef};
pub use mesh::{Mesh, Submesh, Topology};
pub use node::{GeometryBinding, SceneNode};
