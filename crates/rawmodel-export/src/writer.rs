//! Writes the rawbuffer blob and its manifest

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use rawmodel_core::{Error, Result, ResultExt};
use tempfile::{NamedTempFile, TempPath};
use tracing::{debug, info, warn};

use crate::manifest::Manifest;
use crate::options::ExportOptions;
use crate::vertex::{Vertex, VERTEX_SIZE};

/// Blob length in bytes for the given buffer sizes
pub fn blob_size(vertex_count: usize, index_count: usize) -> usize {
    vertex_count * VERTEX_SIZE + index_count * std::mem::size_of::<u32>()
}

/// Encode vertices then indices as little-endian `f32`/`u32`
pub fn encode_blob<W: Write + ?Sized>(writer: &mut W, vertices: &[Vertex], indices: &[u32]) -> std::io::Result<()> {
    for vertex in vertices {
        for &value in vertex.as_floats() {
            writer.write_f32::<LittleEndian>(value)?;
        }
    }
    for &index in indices {
        writer.write_u32::<LittleEndian>(index)?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
pub struct RawModelWriter {
    pretty_json: bool,
    atomic_writes: bool,
}

impl Default for RawModelWriter {
    fn default() -> Self {
        Self::from_options(&ExportOptions::default())
    }
}

impl RawModelWriter {
    pub fn new(pretty_json: bool, atomic_writes: bool) -> Self {
        Self { pretty_json, atomic_writes }
    }

    /// Writer configured by the JSON and atomicity flags of `options`
    pub fn from_options(options: &ExportOptions) -> Self {
        Self::new(options.pretty_json, options.atomic_writes)
    }

    /// Write the blob and manifest
    ///
    /// With atomic writes both files are fully staged before either final
    /// name is replaced, and the blob lands before the manifest that
    /// references it. If the manifest cannot be replaced, the blob that was
    /// there before is put back so the old manifest still matches it.
    pub fn write(
        &self,
        manifest: &Manifest,
        vertices: &[Vertex],
        indices: &[u32],
        blob_path: &Path,
        manifest_path: &Path,
    ) -> Result<()> {
        let json = manifest
            .to_json(self.pretty_json)
            .map_err(Error::from)
            .context("serializing manifest")?;

        info!(path = %blob_path.display(), "Writing raw buffer...");
        debug!(
            bytes = blob_size(vertices.len(), indices.len()),
            vertices = vertices.len(),
            indices = indices.len(),
            "Encoding blob"
        );

        if self.atomic_writes {
            let blob = stage(blob_path, |w| encode_blob(w, vertices, indices))?;
            info!(path = %manifest_path.display(), "Writing manifest...");
            let manifest_file = stage(manifest_path, |w| w.write_all(json.as_bytes()))?;

            let previous_blob = back_up(blob_path)?;
            persist(blob, blob_path)?;
            if let Err(err) = persist(manifest_file, manifest_path) {
                roll_back(previous_blob, blob_path);
                return Err(err);
            }
        } else {
            write_direct(blob_path, |w| encode_blob(w, vertices, indices))?;
            info!(path = %manifest_path.display(), "Writing manifest...");
            write_direct(manifest_path, |w| w.write_all(json.as_bytes()))?;
        }

        Ok(())
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Write into a temporary file next to `path`
fn stage<F>(path: &Path, fill: F) -> Result<NamedTempFile>
where
    F: FnOnce(&mut BufWriter<&File>) -> std::io::Result<()>,
{
    let dir = parent_dir(path);
    let file = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temporary file in {}", dir.display()))?;

    {
        let mut writer = BufWriter::new(file.as_file());
        fill(&mut writer)
            .and_then(|_| writer.flush())
            .with_context(|| format!("writing {}", path.display()))?;
    }
    file.as_file()
        .sync_all()
        .with_context(|| format!("syncing {}", path.display()))?;

    Ok(file)
}

fn persist(file: NamedTempFile, path: &Path) -> Result<()> {
    file.persist(path)
        .map_err(|e| Error::from(e.error))
        .with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

/// Copy an existing file at `path` to a temporary file next to it
fn back_up(path: &Path) -> Result<Option<TempPath>> {
    if !path.is_file() {
        return Ok(None);
    }
    let dir = parent_dir(path);
    let backup = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temporary file in {}", dir.display()))?
        .into_temp_path();
    std::fs::copy(path, &backup).with_context(|| format!("backing up {}", path.display()))?;
    Ok(Some(backup))
}

/// Undo a blob replacement after the manifest failed to land
fn roll_back(previous: Option<TempPath>, path: &Path) {
    let restored = match previous {
        Some(backup) => backup.persist(path).map_err(|e| e.error),
        None => std::fs::remove_file(path),
    };
    if let Err(err) = restored {
        warn!(path = %path.display(), error = %err, "Failed to restore raw buffer");
    }
}

fn write_direct<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    fill(&mut writer)
        .and_then(|_| writer.flush())
        .with_context(|| format!("writing {}", path.display()))
}
