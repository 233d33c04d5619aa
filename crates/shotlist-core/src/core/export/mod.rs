//! Export Module
//!
//! Writes a project's shots to disk. The destination extension picks the
//! format:
//!
//! | Extension | Output |
//! |-----------|--------|
//! | `.edl`    | Edit Decision List ([`crate::core::edl`]) |
//! | `.xlsx`   | Excel workbook, one row per shot |
//! | `.csv`    | spreadsheet, one row per shot |
//! | `.json`   | shot documents |
//!
//! Shots are always exported in scene / shot / take order. Files are written
//! atomically.

mod spreadsheet;

pub use spreadsheet::{export_csv, export_json, export_xlsx, CSV_COLUMNS, XLSX_SHEET_NAME};

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::edl::emit_edl;
use crate::core::fs::{atomic_write_bytes, validate_output_path};
use crate::core::storage::ShotDb;
use crate::core::{CoreError, CoreResult, ShotRecord};

// =============================================================================
// Types
// =============================================================================

/// Export file format
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Edl,
    Xlsx,
    Csv,
    Json,
}

/// Extensions accepted for export destinations
pub const EXPORT_EXTENSIONS: [&str; 4] = ["edl", "xlsx", "csv", "json"];

impl ExportFormat {
    /// Picks the format from the destination's extension (case-insensitive)
    pub fn from_path(path: &Path) -> CoreResult<Self> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "edl" => Ok(Self::Edl),
            "xlsx" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "" => Err(CoreError::UnsupportedExportFormat(format!(
                "{} has no file extension",
                path.display()
            ))),
            other => Err(CoreError::UnsupportedExportFormat(format!(".{}", other))),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Edl => "edl",
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// Renders `records` in this format
    pub fn render(&self, project: &str, records: &[ShotRecord]) -> CoreResult<Vec<u8>> {
        match self {
            Self::Edl => emit_edl(project, records).map(String::into_bytes),
            Self::Xlsx => export_xlsx(records),
            Self::Csv => Ok(export_csv(records).into_bytes()),
            Self::Json => export_json(project, records).map(String::into_bytes),
        }
    }
}

/// Outcome of a finished export
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    pub format: ExportFormat,
    pub output_path: PathBuf,
    pub shot_count: usize,
    pub bytes_written: usize,
}

// =============================================================================
// Export
// =============================================================================

/// Renders `records` and writes them to `output_path`
pub fn export_records(
    project: &str,
    records: &[ShotRecord],
    output_path: &Path,
) -> CoreResult<ExportResult> {
    let format = ExportFormat::from_path(output_path)?;
    let output_path = validate_output_path(output_path, "Export path")?;

    // Render fully before touching the destination.
    let content = format.render(project, records)?;
    atomic_write_bytes(&output_path, &content)?;

    info!(
        "Exported {} shots of '{}' as {} to {}",
        records.len(),
        project,
        format.extension(),
        output_path.display()
    );

    Ok(ExportResult {
        format,
        output_path,
        shot_count: records.len(),
        bytes_written: content.len(),
    })
}

/// Loads `project` from `db` in key order and exports it to `output_path`.
///
/// A project without shots exports as an empty document (header-only EDL).
pub fn export_project(db: &ShotDb, project: &str, output_path: &Path) -> CoreResult<ExportResult> {
    let records = db.list_shots(project)?;
    export_records(project, &records, output_path)
}

// =============================================================================
// Tests
// =============================================================================
