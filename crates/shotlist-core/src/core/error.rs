//! Shotlist Error Definitions
//!
//! Defines error types used throughout the project.

use thiserror::Error;

use super::ShotKey;

/// Core engine error types
#[derive(Error, Debug)]
pub enum CoreError {
    // =========================================================================
    // Record Errors
    // =========================================================================
    #[error("Invalid record {key}: {reason}")]
    InvalidRecord { key: ShotKey, reason: String },

    #[error("Records out of order: {next} follows {previous}")]
    UnsortedRecords { previous: ShotKey, next: ShotKey },

    // =========================================================================
    // Storage Errors
    // =========================================================================
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Shot not found: {project} {key}")]
    ShotNotFound { project: String, key: ShotKey },

    #[error("Shot already exists: {project} {key}")]
    DuplicateShot { project: String, key: ShotKey },

    #[error("Database error: {0}")]
    Database(String),

    // =========================================================================
    // Export Errors
    // =========================================================================
    #[error("Unsupported export format: {0}")]
    UnsupportedExportFormat(String),

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Workbook error: {0}")]
    WorkbookError(#[from] rust_xlsxwriter::XlsxError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Core engine result type
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Builds an [`CoreError::InvalidRecord`] for the given key
    pub fn invalid_record(key: ShotKey, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            key,
            reason: reason.into(),
        }
    }
}
