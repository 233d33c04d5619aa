//! Filesystem utilities.
//!
//! Safe primitives for writing export files and attached images:
//! - Path component validation for names that become file or directory names.
//! - Atomic writes (temp file + rename) so an interrupted export never leaves a
//!   truncated EDL behind.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::core::{CoreError, CoreResult};

// =============================================================================
// Path Validation Utilities
// =============================================================================

/// Validates that a name is safe to use as a single path component.
///
/// Rejects empty names, `..`, path separators and drive letter indicators.
pub fn validate_path_component(name: &str, label: &str) -> CoreResult<()> {
    if name.trim().is_empty() {
        return Err(CoreError::ValidationError(format!("{label} is empty")));
    }

    if name.contains("..") || name.contains('/') || name.contains('\\') || name.contains(':') {
        return Err(CoreError::ValidationError(format!(
            "{label} contains invalid characters (path traversal): {name}"
        )));
    }

    if name.chars().any(|c| c.is_control()) {
        return Err(CoreError::ValidationError(format!(
            "{label} contains control characters"
        )));
    }

    Ok(())
}

/// Validates an export destination.
///
/// Creates the parent directory when missing and refuses to overwrite a
/// directory.
pub fn validate_output_path(path: &Path, label: &str) -> CoreResult<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(CoreError::ValidationError(format!("{label} is empty")));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    if path.is_dir() {
        return Err(CoreError::ValidationError(format!(
            "{label} points to a directory: {}",
            path.display()
        )));
    }

    Ok(path.to_path_buf())
}

// =============================================================================
// Atomic Writes
// =============================================================================

/// Write bytes to `path` using an atomic replace pattern.
///
/// Implementation notes:
/// - Write to a sibling temporary file.
/// - Flush and sync the temp file.
/// - Swap into place by renaming.
/// - If the destination exists, it is first moved aside as a `.bak` file, then removed.
pub fn atomic_write_bytes(path: &Path, bytes: &[u8]) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = sibling_path(path, "tmp");
    {
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(bytes)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }

    atomic_replace(path, &tmp_path)
}

/// Write a JSON file atomically with pretty formatting.
pub fn atomic_write_json_pretty<T: serde::Serialize>(path: &Path, value: &T) -> CoreResult<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    atomic_write_bytes(path, &bytes)
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut sibling = path.to_path_buf();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| suffix.to_string());
    sibling.set_file_name(format!("{file_name}.{suffix}"));
    sibling
}

fn atomic_replace(dest: &Path, src_tmp: &Path) -> CoreResult<()> {
    if !dest.exists() {
        std::fs::rename(src_tmp, dest)?;
        return Ok(());
    }

    // rename-over-existing is not portable; swap through a backup.
    let bak = sibling_path(dest, "bak");
    if bak.exists() {
        let _ = std::fs::remove_file(&bak);
    }

    std::fs::rename(dest, &bak)?;
    match std::fs::rename(src_tmp, dest) {
        Ok(()) => {
            let _ = std::fs::remove_file(&bak);
            Ok(())
        }
        Err(e) => {
            let _ = std::fs::rename(&bak, dest);
            let _ = std::fs::remove_file(src_tmp);
            Err(CoreError::IoError(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn atomic_write_bytes_creates_and_replaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cut.edl");

        atomic_write_bytes(&path, b"one").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one");

        atomic_write_bytes(&path, b"two").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "two");

        assert!(!dir.path().join("cut.edl.tmp").exists());
        assert!(!dir.path().join("cut.edl.bak").exists());
    }

    #[test]
    fn atomic_write_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("shots.json");

        atomic_write_json_pretty(&path, &vec![1, 2, 3]).unwrap();
        let back: Vec<i32> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, vec![1, 2, 3]);
    }

    #[test]
    fn test_validate_path_component() {
        assert!(validate_path_component("Pilot", "project").is_ok());
        assert!(validate_path_component("Spot 2024-05", "project").is_ok());

        assert!(validate_path_component("", "project").is_err());
        assert!(validate_path_component("   ", "project").is_err());
        assert!(validate_path_component("..", "project").is_err());
        assert!(validate_path_component("a/b", "project").is_err());
        assert!(validate_path_component("a\\b", "project").is_err());
        assert!(validate_path_component("C:", "project").is_err());
        assert!(validate_path_component("bad\nname", "project").is_err());
    }

    #[test]
    fn test_validate_output_path() {
        let dir = TempDir::new().unwrap();

        let nested = dir.path().join("out").join("pilot.edl");
        let validated = validate_output_path(&nested, "output").unwrap();
        assert_eq!(validated, nested);
        assert!(dir.path().join("out").is_dir());

        assert!(validate_output_path(dir.path(), "output").is_err());
        assert!(validate_output_path(Path::new(""), "output").is_err());
    }
}
