//! Reference stills attached to shots.
//!
//! Images are copied into `{root}/{project}/{scene}_{shot}_{take}.{ext}`.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::core::fs::{atomic_write_bytes, validate_path_component};
use crate::core::{CoreError, CoreResult, ShotKey};

/// Accepted image extensions (lowercase)
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Directory of copied reference stills
#[derive(Clone, Debug)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the still of `key` lands for a given extension
    pub fn image_path(&self, project: &str, key: ShotKey, extension: &str) -> CoreResult<PathBuf> {
        validate_path_component(project, "Project name")?;
        Ok(self.root.join(project).join(format!(
            "{}_{}_{}.{}",
            key.scene, key.shot, key.take, extension
        )))
    }

    /// Copies `source` into the store and returns the stored path
    pub fn attach(&self, project: &str, key: ShotKey, source: &Path) -> CoreResult<PathBuf> {
        let extension = source
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .filter(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
            .ok_or_else(|| {
                CoreError::ValidationError(format!(
                    "Unsupported image type: {} (expected one of {:?})",
                    source.display(),
                    IMAGE_EXTENSIONS
                ))
            })?;

        if !source.is_file() {
            return Err(CoreError::ValidationError(format!(
                "Image not found: {}",
                source.display()
            )));
        }

        let dest = self.image_path(project, key, &extension)?;
        let bytes = std::fs::read(source)?;
        atomic_write_bytes(&dest, &bytes)?;

        info!("Attached {} to shot {} as {}", source.display(), key, dest.display());
        Ok(dest)
    }
}
