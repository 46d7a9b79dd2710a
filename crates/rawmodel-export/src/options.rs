//! Export configuration

use std::path::{Path, PathBuf};

use rawmodel_core::{Error, Result, ResultExt};
use serde::{Deserialize, Serialize};

/// How normals are carried into world space
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NormalTransform {
    /// Forward world matrix, as existing consumers expect. Only exact
    /// without non-uniform scale.
    #[default]
    Forward,
    /// Inverse-transpose of the world matrix for normals
    InverseTranspose,
}

impl std::str::FromStr for NormalTransform {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "forward" => Ok(NormalTransform::Forward),
            "inverse-transpose" | "inverse_transpose" => Ok(NormalTransform::InverseTranspose),
            _ => Err(format!("Unknown normal transform: {}", s)),
        }
    }
}

/// Export options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Copy referenced textures next to the manifest
    pub copy_textures: bool,
    /// Directory texture asset paths are relative to (current directory if unset)
    pub texture_root: Option<PathBuf>,
    pub normal_transform: NormalTransform,
    /// Pretty-print the manifest
    pub pretty_json: bool,
    /// Write through temporary files and rename into place
    pub atomic_writes: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            copy_textures: false,
            texture_root: None,
            normal_transform: NormalTransform::Forward,
            pretty_json: true,
            atomic_writes: true,
        }
    }
}

impl ExportOptions {
    /// Load options from a YAML or JSON file; missing keys keep their defaults
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading export options {}", path.display()))?;
        serde_yaml::from_str(&text)
            .map_err(|e| Error::invalid_data(e.to_string()))
            .with_context(|| format!("parsing export options {}", path.display()))
    }
}
