//! The JSON manifest describing a rawbuffer

use std::path::Path;

use rawmodel_core::BoundingBox;
use serde::{Deserialize, Serialize};

use crate::accumulator::SubmeshRange;
use crate::material::MaterialDescriptor;
use crate::traversal::SceneCollection;

/// Manifest format version understood by consumers
pub const RAW_MODEL_VERSION: i64 = 2;

pub const RAWBUFFER_EXTENSION: &str = "rawbuffer";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestHeader {
    pub version: i64,
    /// Identifier of the source scene
    pub original_filename: String,
    /// Blob file name, relative to the manifest
    pub rawbuffer_filename: String,
    pub num_vertices: u32,
    pub num_triangles: u32,
}

/// One exported submesh: its index range and material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshEntry {
    #[serde(flatten)]
    pub range: SubmeshRange,
    #[serde(flatten)]
    pub material: MaterialDescriptor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub header: ManifestHeader,
    pub bounding_box: BoundingBox,
    pub meshes: Vec<MeshEntry>,
}

impl Manifest {
    pub fn new(
        original_filename: impl Into<String>,
        rawbuffer_filename: impl Into<String>,
        collection: &SceneCollection,
    ) -> Self {
        Self {
            header: ManifestHeader {
                version: RAW_MODEL_VERSION,
                original_filename: original_filename.into(),
                rawbuffer_filename: rawbuffer_filename.into(),
                num_vertices: collection.geometry.vertex_count(),
                num_triangles: collection.geometry.triangle_count(),
            },
            bounding_box: collection.bounding_box,
            meshes: collection.meshes.clone(),
        }
    }

    pub fn num_indices(&self) -> usize {
        self.header.num_triangles as usize * 3
    }

    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

/// Blob file name for a manifest path: its stem plus `.rawbuffer`
pub fn rawbuffer_filename_for(manifest_path: &Path) -> String {
    let stem = manifest_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}.{}", stem, RAWBUFFER_EXTENSION)
}
