//! Settings Persistence System
//!
//! Provides persistent application settings with:
//! - Atomic file writes (temp file + rename)
//! - Schema validation with defaults
//! - Migration support for schema changes
//!
//! Storage location: {data_dir}/settings.json

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::export::EXPORT_EXTENSIONS;
use crate::core::fs::{atomic_write_json_pretty, validate_path_component};
use crate::core::{is_supported_fps, CoreError, CoreResult, DEFAULT_CAMERA, DEFAULT_OPERATOR};

/// Settings schema version for migration support
pub const SETTINGS_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE: &str = "settings.json";

/// Lock file name (advisory lock to prevent concurrent writers)
pub const SETTINGS_LOCK_FILE: &str = "settings.json.lock";

/// Application directory name under the platform data dir
pub const APP_DIR_NAME: &str = "shotlist";

/// Platform data directory for shotlist (falls back to `./.shotlist`)
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".shotlist"))
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Schema version for migrations
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub general: GeneralSettings,

    /// Defaults for newly logged shots
    #[serde(default)]
    pub shots: ShotDefaults,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub export: ExportSettings,
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            general: GeneralSettings::default(),
            shots: ShotDefaults::default(),
            storage: StorageSettings::default(),
            export: ExportSettings::default(),
        }
    }
}

impl AppSettings {
    /// Normalizes settings so persisted state is always valid.
    ///
    /// Bad values are replaced with defaults rather than rejected, so an old or
    /// hand-edited file never blocks startup.
    pub fn normalize(&mut self) {
        self.version = SETTINGS_VERSION;

        if self.general.operator_name.trim().is_empty() {
            self.general.operator_name = default_operator_name();
        }

        if !is_supported_fps(self.shots.fps) {
            self.shots.fps = default_fps();
        }
        self.shots.duration = self.shots.duration.clamp(1, 86_400);
        if self.shots.camera.trim().is_empty() {
            self.shots.camera = default_camera();
        }

        if validate_path_component(&self.storage.database_file, "databaseFile").is_err() {
            self.storage.database_file = default_database_file();
        }
        if validate_path_component(&self.storage.images_dir, "imagesDir").is_err() {
            self.storage.images_dir = default_images_dir();
        }

        self.export.default_format = normalize_enum(
            &self.export.default_format,
            &EXPORT_EXTENSIONS,
            default_export_format(),
        );
        if self
            .export
            .output_dir
            .as_deref()
            .is_some_and(|d| d.trim().is_empty())
        {
            self.export.output_dir = None;
        }
    }

    /// Sets one value by its dotted camelCase key, e.g. `shots.fps`
    pub fn set_value(&mut self, key: &str, value: &str) -> CoreResult<()> {
        let parse_u32 = |v: &str| -> CoreResult<u32> {
            v.trim()
                .parse()
                .map_err(|_| CoreError::ValidationError(format!("{key} expects a number, got '{v}'")))
        };

        match key {
            "general.operatorName" => self.general.operator_name = value.to_string(),
            "shots.fps" => {
                let fps = parse_u32(value)?;
                if !is_supported_fps(fps) {
                    return Err(CoreError::ValidationError(format!(
                        "Unsupported frame rate: {fps}"
                    )));
                }
                self.shots.fps = fps;
            }
            "shots.duration" => self.shots.duration = parse_u32(value)?,
            "shots.camera" => self.shots.camera = value.to_string(),
            "storage.databaseFile" => {
                validate_path_component(value, key)?;
                self.storage.database_file = value.to_string();
            }
            "storage.imagesDir" => {
                validate_path_component(value, key)?;
                self.storage.images_dir = value.to_string();
            }
            "export.defaultFormat" => {
                let format = value.trim().to_ascii_lowercase();
                if !EXPORT_EXTENSIONS.contains(&format.as_str()) {
                    return Err(CoreError::ValidationError(format!(
                        "Unsupported export format: {value} (expected one of {})",
                        EXPORT_EXTENSIONS.join(", ")
                    )));
                }
                self.export.default_format = format;
            }
            "export.outputDir" => {
                self.export.output_dir = Some(value.to_string()).filter(|v| !v.trim().is_empty())
            }
            _ => {
                return Err(CoreError::ValidationError(format!(
                    "Unknown setting: {key}"
                )))
            }
        }

        self.normalize();
        Ok(())
    }
}

fn normalize_enum(value: &str, allowed: &[&str], fallback: String) -> String {
    if allowed.iter().any(|v| v.eq_ignore_ascii_case(value)) {
        value.to_ascii_lowercase()
    } else {
        fallback
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneralSettings {
    /// Stamped into `created_by` of new shots
    #[serde(default = "default_operator_name")]
    pub operator_name: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            operator_name: default_operator_name(),
        }
    }
}

fn default_operator_name() -> String {
    DEFAULT_OPERATOR.to_string()
}

/// Values used when a new shot omits them
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShotDefaults {
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// Seconds
    #[serde(default = "default_duration")]
    pub duration: u32,

    #[serde(default = "default_camera")]
    pub camera: String,
}

impl Default for ShotDefaults {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            duration: default_duration(),
            camera: default_camera(),
        }
    }
}

fn default_fps() -> u32 {
    25
}

fn default_duration() -> u32 {
    3
}

fn default_camera() -> String {
    DEFAULT_CAMERA.to_string()
}

/// File locations relative to the data directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorageSettings {
    #[serde(default = "default_database_file")]
    pub database_file: String,

    #[serde(default = "default_images_dir")]
    pub images_dir: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_file: default_database_file(),
            images_dir: default_images_dir(),
        }
    }
}

impl StorageSettings {
    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.database_file)
    }

    pub fn images_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.images_dir)
    }
}

fn default_database_file() -> String {
    "shots.db".to_string()
}

fn default_images_dir() -> String {
    "images".to_string()
}

/// Export settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportSettings {
    /// Format used when the export destination is not given (edl, xlsx, csv, json)
    #[serde(default = "default_export_format")]
    pub default_format: String,

    /// Directory for exports without an explicit destination (None = cwd)
    #[serde(default)]
    pub output_dir: Option<String>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            default_format: default_export_format(),
            output_dir: None,
        }
    }
}

impl ExportSettings {
    /// Default destination for `project`: `{output_dir}/{project}.{format}`
    pub fn default_output_path(&self, project: &str) -> PathBuf {
        let file_name = format!("{}.{}", project, self.default_format);
        match &self.output_dir {
            Some(dir) => PathBuf::from(dir).join(file_name),
            None => PathBuf::from(file_name),
        }
    }
}

fn default_export_format() -> String {
    "edl".to_string()
}

// =============================================================================
// Settings Manager
// =============================================================================

/// Settings manager for loading, saving, and resetting settings
pub struct SettingsManager {
    settings_path: PathBuf,
}

impl SettingsManager {
    /// Create a new settings manager with the given data directory
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            settings_path: data_dir.join(SETTINGS_FILE),
        }
    }

    fn lock_path(&self) -> PathBuf {
        self.settings_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(SETTINGS_LOCK_FILE)
    }

    fn with_lock<T>(&self, exclusive: bool, op: impl FnOnce() -> CoreResult<T>) -> CoreResult<T> {
        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let lock_file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())?;

        if exclusive {
            fs2::FileExt::lock_exclusive(&lock_file)?;
        } else {
            fs2::FileExt::lock_shared(&lock_file)?;
        }

        let result = op();

        if let Err(e) = fs2::FileExt::unlock(&lock_file) {
            warn!("Failed to unlock settings lock file: {}", e);
        }

        result
    }

    /// Get the settings file path
    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Load settings from disk, returning defaults if the file is missing or unreadable
    pub fn load(&self) -> AppSettings {
        let result = self.with_lock(false, || {
            if !self.settings_path.exists() {
                info!("Settings file not found, using defaults");
                return Ok(AppSettings::default());
            }

            let content = fs::read_to_string(&self.settings_path)?;
            let mut settings = serde_json::from_str::<AppSettings>(&content)?;

            if settings.version < SETTINGS_VERSION {
                info!(
                    "Migrating settings from version {} to {}",
                    settings.version, SETTINGS_VERSION
                );
                settings = self.migrate(settings);
            }

            settings.normalize();
            Ok(settings)
        });

        match result {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to load settings, using defaults: {}", e);
                AppSettings::default()
            }
        }
    }

    /// Save settings to disk atomically and return what was written
    pub fn save(&self, settings: &AppSettings) -> CoreResult<AppSettings> {
        self.with_lock(true, || {
            let mut normalized = settings.clone();
            normalized.normalize();

            atomic_write_json_pretty(&self.settings_path, &normalized)?;

            info!("Settings saved to {:?}", self.settings_path);
            Ok(normalized)
        })
    }

    /// Reset settings to defaults and delete the settings file
    pub fn reset(&self) -> CoreResult<AppSettings> {
        self.with_lock(true, || {
            if self.settings_path.exists() {
                fs::remove_file(&self.settings_path)?;
                info!("Settings file deleted");
            }
            Ok(AppSettings::default())
        })
    }

    fn migrate(&self, mut settings: AppSettings) -> AppSettings {
        settings.version = SETTINGS_VERSION;
        settings
    }
}
