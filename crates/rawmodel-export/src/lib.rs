//! rawmodel export pipeline
//!
//! Flattens a scene graph into a single interleaved vertex/index buffer and
//! writes it as a pair of files:
//! - `<name>.rawbuffer`: vertices (48 bytes each) followed by `u32` indices
//! - `<name>.json`: header, scene bounding box and per-submesh ranges with
//!   material descriptors

pub mod accumulator;
pub mod exporter;
pub mod manifest;
pub mod material;
pub mod options;
pub mod reader;
pub mod textures;
pub mod traversal;
pub mod vertex;
pub mod writer;

pub use accumulator::{GeometryAccumulator, SubmeshRange};
pub use exporter::{ExportReport, RawModelExporter};
pub use manifest::{
    rawbuffer_filename_for, Manifest, ManifestHeader, MeshEntry, RAWBUFFER_EXTENSION, RAW_MODEL_VERSION,
};
pub use material::{
    Channel, DiffuseOrigin, MaterialDescriptor, MaterialResolver, MetallicOrigin, NormalmapOrigin,
    ReferencedTextures, RoughnessOrigin,
};
pub use options::{ExportOptions, NormalTransform};
pub use reader::{decode_blob, RawModel};
pub use textures::{copy_textures, TextureCopyReport};
pub use traversal::{Diagnostic, DiagnosticKind, SceneCollection, SceneTraversal};
pub use vertex::{transform_vertex, Vertex, VertexTransform, VERTEX_SIZE};
pub use writer::{blob_size, encode_blob, RawModelWriter};
