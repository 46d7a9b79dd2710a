//! Export entry point
//!
//! Ties traversal, writing and texture copying together for one export.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rawmodel_core::logging::timed;
use rawmodel_core::{BoundingBox, Error, Result};
use rawmodel_scene::SceneNode;
use serde::Serialize;
use tracing::{debug, info};

use crate::manifest::{rawbuffer_filename_for, Manifest, RAWBUFFER_EXTENSION};
use crate::material::ReferencedTextures;
use crate::options::ExportOptions;
use crate::textures::{copy_textures, TextureCopyReport};
use crate::traversal::{Diagnostic, SceneTraversal};
use crate::writer::RawModelWriter;

/// Manifest paths with an export currently running
static IN_FLIGHT: Mutex<BTreeSet<PathBuf>> = parking_lot::const_mutex(BTreeSet::new());

/// Claims a manifest path until dropped
struct ExportGuard {
    key: PathBuf,
}

impl ExportGuard {
    fn acquire(manifest_path: &Path) -> Result<Self> {
        let key = std::path::absolute(manifest_path).unwrap_or_else(|_| manifest_path.to_path_buf());
        if !IN_FLIGHT.lock().insert(key.clone()) {
            return Err(Error::ExportBusy);
        }
        Ok(Self { key })
    }
}

impl Drop for ExportGuard {
    fn drop(&mut self) {
        IN_FLIGHT.lock().remove(&self.key);
    }
}

/// Summary of a finished export
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub manifest_path: PathBuf,
    pub blob_path: PathBuf,
    pub vertex_count: u32,
    pub triangle_count: u32,
    pub mesh_count: usize,
    pub objects_visited: usize,
    pub bounding_box: BoundingBox,
    pub textures: ReferencedTextures,
    pub diagnostics: Vec<Diagnostic>,
    pub texture_copy: Option<TextureCopyReport>,
}

#[derive(Debug, Clone, Default)]
pub struct RawModelExporter {
    options: ExportOptions,
}

impl RawModelExporter {
    /// Exporter that writes with `options`
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    /// Export `roots` and their active descendants to `manifest_path`
    ///
    /// The blob is written next to the manifest as `<stem>.rawbuffer`.
    /// `source_id` names the source scene in the manifest header.
    pub fn export(&self, roots: &[&dyn SceneNode], source_id: &str, manifest_path: impl AsRef<Path>) -> Result<ExportReport> {
        let manifest_path = manifest_path.as_ref();
        if roots.is_empty() {
            return Err(Error::EmptySelection);
        }
        let blob_filename = rawbuffer_filename_for(manifest_path);
        let blob_path = manifest_path.with_file_name(&blob_filename);
        let is_blob_extension = manifest_path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(RAWBUFFER_EXTENSION));
        if is_blob_extension || blob_path == manifest_path {
            return Err(Error::invalid_data(format!(
                "manifest path {} would overwrite its own raw buffer",
                manifest_path.display()
            )));
        }
        let _guard = ExportGuard::acquire(manifest_path)?;

        info!(
            roots = roots.len(),
            output = %manifest_path.display(),
            "Exporting scene {}", source_id
        );

        let traversal = SceneTraversal::new(self.options.normal_transform);
        let collection = timed("collect", || traversal.collect(roots));
        for diagnostic in &collection.diagnostics {
            debug!(%diagnostic, "Export diagnostic");
        }
        info!(
            vertices = collection.geometry.vertex_count(),
            triangles = collection.geometry.triangle_count(),
            meshes = collection.meshes.len(),
            "Collected geometry"
        );

        let manifest = Manifest::new(source_id, blob_filename, &collection);

        let writer = RawModelWriter::from_options(&self.options);
        timed("write", || {
            writer.write(
                &manifest,
                collection.geometry.vertices(),
                collection.geometry.indices(),
                &blob_path,
                manifest_path,
            )
        })?;

        let texture_copy = if self.options.copy_textures {
            let source_root = self.options.texture_root.clone().unwrap_or_else(|| PathBuf::from("."));
            let destination = match manifest_path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            Some(timed("textures", || copy_textures(&collection.textures, &source_root, &destination)))
        } else {
            None
        };

        info!(
            manifest = %manifest_path.display(),
            blob = %blob_path.display(),
            "Export complete"
        );

        Ok(ExportReport {
            manifest_path: manifest_path.to_path_buf(),
            blob_path,
            vertex_count: manifest.header.num_vertices,
            triangle_count: manifest.header.num_triangles,
            mesh_count: manifest.meshes.len(),
            objects_visited: collection.objects_visited,
            bounding_box: collection.bounding_box,
            textures: collection.textures,
            diagnostics: collection.diagnostics,
            texture_copy,
        })
    }
}
