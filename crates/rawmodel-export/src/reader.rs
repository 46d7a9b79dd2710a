//! Loads an exported model back from its manifest and blob

use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt};
use rawmodel_core::{Error, Result, ResultExt};
use tracing::{debug, warn};

use crate::manifest::{Manifest, RAW_MODEL_VERSION};
use crate::vertex::Vertex;
use crate::writer::blob_size;

/// A manifest together with its decoded buffers
#[derive(Debug, Clone)]
pub struct RawModel {
    pub manifest: Manifest,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub manifest_path: PathBuf,
}

impl RawModel {
    pub fn load(manifest_path: impl AsRef<Path>) -> Result<Self> {
        let manifest_path = manifest_path.as_ref();
        if !manifest_path.exists() {
            return Err(Error::FileNotFound(manifest_path.to_path_buf()));
        }

        let text = std::fs::read_to_string(manifest_path)
            .with_context(|| format!("reading manifest {}", manifest_path.display()))?;
        let manifest: Manifest = serde_json::from_str(&text)
            .with_context(|| format!("parsing manifest {}", manifest_path.display()))?;

        if manifest.header.version != RAW_MODEL_VERSION {
            warn!(
                version = manifest.header.version,
                expected = RAW_MODEL_VERSION,
                path = %manifest_path.display(),
                "Manifest version differs, reading anyway"
            );
        }

        let filename = &manifest.header.rawbuffer_filename;
        if filename.is_empty() || filename.contains('*') {
            return Err(Error::invalid_data(format!(
                "manifest {} has no usable rawbufferFilename ({:?})",
                manifest_path.display(),
                filename
            )));
        }

        let blob_path = manifest_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(filename);
        if !blob_path.exists() {
            return Err(Error::FileNotFound(blob_path));
        }
        let blob = std::fs::read(&blob_path)
            .with_context(|| format!("reading raw buffer {}", blob_path.display()))?;

        let (vertices, indices) = decode_blob(
            &blob,
            manifest.header.num_vertices as usize,
            manifest.num_indices(),
        )
        .with_context(|| format!("decoding raw buffer {}", blob_path.display()))?;

        debug!(
            vertices = vertices.len(),
            indices = indices.len(),
            meshes = manifest.meshes.len(),
            "Loaded raw model"
        );

        Ok(Self {
            manifest,
            vertices,
            indices,
            manifest_path: manifest_path.to_path_buf(),
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Structural problems, empty if the model is consistent
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let vertex_count = self.vertices.len();

        if let Some((at, index)) = self
            .indices
            .iter()
            .enumerate()
            .find(|(_, &i)| i as usize >= vertex_count)
        {
            problems.push(format!(
                "index {} at position {} is out of range for {} vertices",
                index, at, vertex_count
            ));
        }

        for (i, mesh) in self.manifest.meshes.iter().enumerate() {
            let range = mesh.range;
            if range.num_indices % 3 != 0 {
                problems.push(format!("mesh {} has {} indices, not a multiple of 3", i, range.num_indices));
            }
            if range.end_index() as usize > self.indices.len() {
                problems.push(format!(
                    "mesh {} range {}..{} exceeds {} indices",
                    i,
                    range.start_index,
                    range.end_index(),
                    self.indices.len()
                ));
            }
        }

        problems
    }

    pub fn validate(&self) -> Result<()> {
        match self.problems().first() {
            None => Ok(()),
            Some(problem) => Err(Error::invalid_data(problem.clone())),
        }
    }
}

/// Decode a blob holding `vertex_count` vertices and `index_count` indices
///
/// Trailing bytes are tolerated with a warning.
pub fn decode_blob(blob: &[u8], vertex_count: usize, index_count: usize) -> Result<(Vec<Vertex>, Vec<u32>)> {
    let expected = blob_size(vertex_count, index_count);
    if blob.len() < expected {
        return Err(Error::invalid_data(format!(
            "raw buffer is truncated: {} bytes, expected {}",
            blob.len(),
            expected
        )));
    }
    if blob.len() > expected {
        warn!(extra = blob.len() - expected, "Raw buffer has trailing bytes");
    }

    let mut reader = blob;
    let mut vertices = Vec::with_capacity(vertex_count);
    for _ in 0..vertex_count {
        let mut floats = [0f32; 12];
        reader.read_f32_into::<LittleEndian>(&mut floats)?;
        vertices.push(Vertex::from_floats(floats));
    }

    let mut indices = vec![0u32; index_count];
    reader.read_u32_into::<LittleEndian>(&mut indices)?;

    Ok((vertices, indices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::encode_blob;

    #[test]
    fn test_decode_matches_encode() {
        let vertex = Vertex::from_floats([1.0, 2.0, 3.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, -1.0, 0.5, 0.5]);
        let mut blob = Vec::new();
        encode_blob(&mut blob, &[vertex, vertex], &[0, 1, 1]).unwrap();

        let (vertices, indices) = decode_blob(&blob, 2, 3).unwrap();
        assert_eq!(vertices, vec![vertex, vertex]);
        assert_eq!(indices, vec![0, 1, 1]);
    }

    #[test]
    fn test_truncated_blob() {
        let err = decode_blob(&[0u8; 50], 1, 3).unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_missing_manifest() {
        let err = RawModel::load("/definitely/not/here.json").unwrap_err();
        assert!(err.is_not_found());
    }
}
