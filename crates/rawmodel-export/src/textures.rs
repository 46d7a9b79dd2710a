//! Copies referenced textures next to an exported model
//!
//! Copying is best effort: failures are logged and reported, never
//! propagated.

use std::path::{Component, Path, PathBuf};

use rawmodel_scene::TextureRef;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::material::ReferencedTextures;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextureCopyReport {
    pub copied: Vec<PathBuf>,
    /// Source and destination are the same file
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl TextureCopyReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Copy each texture from `source_root/<path>` to `destination/<path>`
pub fn copy_textures(textures: &ReferencedTextures, source_root: &Path, destination: &Path) -> TextureCopyReport {
    let mut report = TextureCopyReport::default();
    info!(
        count = textures.len(),
        destination = %destination.display(),
        "Copying textures..."
    );

    for texture in textures {
        let relative = texture.as_path().to_path_buf();
        match copy_one(texture, source_root, destination) {
            Ok(true) => report.copied.push(relative),
            Ok(false) => report.skipped.push(relative),
            Err(message) => {
                error!(texture = %texture, "Failed to copy texture: {}", message);
                report.failed.push((relative, message));
            }
        }
    }

    report
}

/// Returns `Ok(false)` when the copy would overwrite its own source
fn copy_one(texture: &TextureRef, source_root: &Path, destination: &Path) -> Result<bool, String> {
    let relative = texture.as_path();
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(format!("path {} is not relative to the asset root", relative.display()));
    }

    let source = source_root.join(relative);
    let target = destination.join(relative);

    if let (Ok(a), Ok(b)) = (source.canonicalize(), target.canonicalize()) {
        if a == b {
            debug!(path = %source.display(), "Texture already in place");
            return Ok(false);
        }
    }

    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(|e| format!("creating {}: {}", parent.display(), e))?;
    }
    std::fs::copy(&source, &target)
        .map_err(|e| format!("{} -> {}: {}", source.display(), target.display(), e))?;

    debug!(from = %source.display(), to = %target.display(), "Copied texture");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textures(paths: &[&str]) -> ReferencedTextures {
        let mut set = ReferencedTextures::new();
        for p in paths {
            set.insert(TextureRef::new(*p));
        }
        set
    }

    #[test]
    fn test_copies_into_matching_layout() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(src.path().join("Assets/Tex")).unwrap();
        std::fs::write(src.path().join("Assets/Tex/a.png"), b"png").unwrap();

        let report = copy_textures(&textures(&["Assets/Tex/a.png"]), src.path(), dst.path());

        assert_eq!(report.copied, vec![PathBuf::from("Assets/Tex/a.png")]);
        assert!(report.is_complete());
        assert_eq!(std::fs::read(dst.path().join("Assets/Tex/a.png")).unwrap(), b"png");
    }

    #[test]
    fn test_failures_are_reported() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();

        let report = copy_textures(&textures(&["missing.png", "../outside.png"]), src.path(), dst.path());

        assert!(report.copied.is_empty());
        assert_eq!(report.failed.len(), 2);
    }

    #[test]
    fn test_same_directory_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"png").unwrap();

        let report = copy_textures(&textures(&["a.png"]), dir.path(), dir.path());

        assert_eq!(report.skipped, vec![PathBuf::from("a.png")]);
        assert_eq!(std::fs::read(dir.path().join("a.png")).unwrap(), b"png");
    }
}
