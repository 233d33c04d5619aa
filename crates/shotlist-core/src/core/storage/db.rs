//! Shot Database Module
//!
//! SQLite database holding every logged shot, one row per
//! `(project, scene, shot, take)`.
//!
//! Every statement binds its values as parameters; no user text is ever
//! spliced into SQL.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{validate_project_name, ShotPatch};
use crate::core::{
    clip_file_name, CoreError, CoreResult, ShotId, ShotKey, ShotMetadata, ShotRecord,
};

const SHOT_COLUMNS: &str = "id, scene, shot, take, duration, fps, clip_name, description, \
     location, time_of_day, shot_size, actors, props, notes, audio, camera, image_path, created_by";

// =============================================================================
// Shot Database
// =============================================================================

/// SQLite database for shot records
pub struct ShotDb {
    conn: Connection,
}

impl ShotDb {
    /// Opens the database at `path`, creating the file and schema when missing
    pub fn open<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| CoreError::Database(format!("Failed to open shot database: {}", e)))?;

        let db = Self { conn };
        db.init_schema()?;
        debug!("Opened shot database at {}", path.display());
        Ok(db)
    }

    /// Creates an in-memory database (for testing)
    pub fn in_memory() -> CoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            CoreError::Database(format!("Failed to create in-memory database: {}", e))
        })?;

        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Initializes the database schema
    fn init_schema(&self) -> CoreResult<()> {
        self.conn
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS shots (
                    id INTEGER PRIMARY KEY,
                    project TEXT NOT NULL,
                    scene INTEGER NOT NULL,
                    shot INTEGER NOT NULL,
                    take INTEGER NOT NULL,
                    duration INTEGER NOT NULL,
                    fps INTEGER NOT NULL,
                    clip_name TEXT NOT NULL,
                    description TEXT NOT NULL DEFAULT '',
                    location TEXT NOT NULL DEFAULT '',
                    time_of_day TEXT NOT NULL,
                    shot_size TEXT NOT NULL,
                    actors TEXT NOT NULL DEFAULT '',
                    props TEXT NOT NULL DEFAULT '',
                    notes TEXT NOT NULL DEFAULT '',
                    audio TEXT NOT NULL,
                    camera TEXT NOT NULL,
                    image_path TEXT,
                    created_by TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    UNIQUE (project, scene, shot, take)
                );
                "#,
            )
            .map_err(|e| CoreError::Database(format!("Failed to initialize schema: {}", e)))?;

        Ok(())
    }

    /// Stores a new shot for `project`.
    ///
    /// The record is validated first and its clip name is normalized to
    /// `{reel}.mov`.
    pub fn insert_shot(&self, project: &str, record: &ShotRecord) -> CoreResult<ShotId> {
        let project = validate_project_name(project)?;
        let record = normalized(record)?;
        let now = Utc::now().to_rfc3339();
        let meta = &record.metadata;

        let result = self.conn.execute(
            r#"
            INSERT INTO shots (
                project, scene, shot, take, duration, fps, clip_name, description,
                location, time_of_day, shot_size, actors, props, notes, audio, camera,
                image_path, created_by, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?19)
            "#,
            params![
                project,
                record.key.scene,
                record.key.shot,
                record.key.take,
                record.duration,
                record.fps,
                record.clip_name,
                meta.description,
                meta.location,
                meta.time_of_day.as_str(),
                meta.shot_size.as_str(),
                meta.actors,
                meta.props,
                meta.notes,
                meta.audio.as_str(),
                meta.camera,
                meta.image_path,
                meta.created_by,
                now,
            ],
        );

        match result {
            Ok(_) => {
                let id = self.conn.last_insert_rowid();
                info!("Added shot {} to project '{}' (id {})", record.key, project, id);
                Ok(id)
            }
            Err(e) if is_constraint_violation(&e) => Err(CoreError::DuplicateShot {
                project: project.to_string(),
                key: record.key,
            }),
            Err(e) => Err(CoreError::Database(format!("Failed to insert shot: {}", e))),
        }
    }

    /// Replaces every non-key field of the stored shot with `record`'s values
    pub fn update_shot(&self, project: &str, record: &ShotRecord) -> CoreResult<()> {
        let project = validate_project_name(project)?;
        let record = normalized(record)?;
        let meta = &record.metadata;

        let changed = self
            .conn
            .execute(
                r#"
                UPDATE shots
                SET duration = ?1, fps = ?2, clip_name = ?3, description = ?4, location = ?5,
                    time_of_day = ?6, shot_size = ?7, actors = ?8, props = ?9, notes = ?10,
                    audio = ?11, camera = ?12, image_path = ?13, created_by = ?14, updated_at = ?15
                WHERE project = ?16 AND scene = ?17 AND shot = ?18 AND take = ?19
                "#,
                params![
                    record.duration,
                    record.fps,
                    record.clip_name,
                    meta.description,
                    meta.location,
                    meta.time_of_day.as_str(),
                    meta.shot_size.as_str(),
                    meta.actors,
                    meta.props,
                    meta.notes,
                    meta.audio.as_str(),
                    meta.camera,
                    meta.image_path,
                    meta.created_by,
                    Utc::now().to_rfc3339(),
                    project,
                    record.key.scene,
                    record.key.shot,
                    record.key.take,
                ],
            )
            .map_err(|e| CoreError::Database(format!("Failed to update shot: {}", e)))?;

        if changed == 0 {
            return Err(CoreError::ShotNotFound {
                project: project.to_string(),
                key: record.key,
            });
        }

        info!("Updated shot {} in project '{}'", record.key, project);
        Ok(())
    }

    /// Applies `patch` to a stored shot and returns the result
    pub fn patch_shot(&self, project: &str, key: ShotKey, patch: &ShotPatch) -> CoreResult<ShotRecord> {
        let mut record = self.require_shot(project, key)?;
        patch.apply(&mut record);
        self.update_shot(project, &record)?;
        self.require_shot(project, key)
    }

    /// Fetches one shot
    pub fn get_shot(&self, project: &str, key: ShotKey) -> CoreResult<Option<ShotRecord>> {
        let sql = format!(
            "SELECT {SHOT_COLUMNS} FROM shots \
             WHERE project = ?1 AND scene = ?2 AND shot = ?3 AND take = ?4"
        );

        let row = self
            .conn
            .query_row(
                &sql,
                params![project, key.scene, key.shot, key.take],
                ShotRow::from_row,
            )
            .optional()
            .map_err(|e| CoreError::Database(format!("Failed to fetch shot: {}", e)))?;

        row.map(ShotRow::into_record).transpose()
    }

    /// Fetches one shot, failing with [`CoreError::ShotNotFound`] when absent
    pub fn require_shot(&self, project: &str, key: ShotKey) -> CoreResult<ShotRecord> {
        self.get_shot(project, key)?
            .ok_or_else(|| CoreError::ShotNotFound {
                project: project.to_string(),
                key,
            })
    }

    /// All shots of `project`, ordered by scene, shot and take
    pub fn list_shots(&self, project: &str) -> CoreResult<Vec<ShotRecord>> {
        let sql = format!(
            "SELECT {SHOT_COLUMNS} FROM shots WHERE project = ?1 ORDER BY scene, shot, take"
        );

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| CoreError::Database(format!("Failed to prepare shot query: {}", e)))?;

        let rows = stmt
            .query_map(params![project], ShotRow::from_row)
            .map_err(|e| CoreError::Database(format!("Failed to query shots: {}", e)))?;

        let mut records = Vec::new();
        for row in rows {
            let row = row.map_err(|e| CoreError::Database(format!("Failed to read shot: {}", e)))?;
            records.push(row.into_record()?);
        }

        debug!("Loaded {} shots for project '{}'", records.len(), project);
        Ok(records)
    }

    /// Distinct project names, alphabetically
    pub fn list_projects(&self) -> CoreResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT project FROM shots ORDER BY project")
            .map_err(|e| CoreError::Database(format!("Failed to prepare project query: {}", e)))?;

        let projects = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| CoreError::Database(format!("Failed to query projects: {}", e)))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CoreError::Database(format!("Failed to read project: {}", e)))?;

        Ok(projects)
    }

    /// Returns true if at least one shot is stored under `project`
    pub fn project_exists(&self, project: &str) -> CoreResult<bool> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM shots WHERE project = ?1",
                params![project],
                |row| row.get(0),
            )
            .map_err(|e| CoreError::Database(format!("Failed to count shots: {}", e)))?;

        Ok(count > 0)
    }

    /// Removes one shot
    pub fn delete_shot(&self, project: &str, key: ShotKey) -> CoreResult<()> {
        let removed = self
            .conn
            .execute(
                "DELETE FROM shots WHERE project = ?1 AND scene = ?2 AND shot = ?3 AND take = ?4",
                params![project, key.scene, key.shot, key.take],
            )
            .map_err(|e| CoreError::Database(format!("Failed to delete shot: {}", e)))?;

        if removed == 0 {
            return Err(CoreError::ShotNotFound {
                project: project.to_string(),
                key,
            });
        }

        info!("Deleted shot {} from project '{}'", key, project);
        Ok(())
    }

    /// Records the reference still of a shot
    pub fn set_image_path(&self, project: &str, key: ShotKey, image_path: &str) -> CoreResult<()> {
        let changed = self
            .conn
            .execute(
                r#"
                UPDATE shots SET image_path = ?1, updated_at = ?2
                WHERE project = ?3 AND scene = ?4 AND shot = ?5 AND take = ?6
                "#,
                params![
                    image_path,
                    Utc::now().to_rfc3339(),
                    project,
                    key.scene,
                    key.shot,
                    key.take
                ],
            )
            .map_err(|e| CoreError::Database(format!("Failed to set image path: {}", e)))?;

        if changed == 0 {
            return Err(CoreError::ShotNotFound {
                project: project.to_string(),
                key,
            });
        }
        Ok(())
    }

    /// Per-project totals
    pub fn project_summary(&self, project: &str) -> CoreResult<ProjectSummary> {
        let (shot_count, total_duration, last_updated): (i64, i64, Option<String>) = self
            .conn
            .query_row(
                "SELECT COUNT(*), COALESCE(SUM(duration), 0), MAX(updated_at) \
                 FROM shots WHERE project = ?1",
                params![project],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(|e| CoreError::Database(format!("Failed to summarize project: {}", e)))?;

        if shot_count == 0 {
            return Err(CoreError::ProjectNotFound(project.to_string()));
        }

        let last_updated = last_updated
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Ok(ProjectSummary {
            name: project.to_string(),
            shot_count: shot_count as usize,
            total_duration_sec: total_duration as u64,
            last_updated,
        })
    }
}

// =============================================================================
// Project Summary
// =============================================================================

/// Totals for one project
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub name: String,
    pub shot_count: usize,
    /// Length of the assembled timeline
    pub total_duration_sec: u64,
    pub last_updated: Option<DateTime<Utc>>,
}

// =============================================================================
// Row Mapping
// =============================================================================

/// Raw column values of a `shots` row
struct ShotRow {
    id: ShotId,
    key: ShotKey,
    duration: u32,
    fps: u32,
    clip_name: String,
    description: String,
    location: String,
    time_of_day: String,
    shot_size: String,
    actors: String,
    props: String,
    notes: String,
    audio: String,
    camera: String,
    image_path: Option<String>,
    created_by: String,
}

impl ShotRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            key: ShotKey::new(row.get(1)?, row.get(2)?, row.get(3)?),
            duration: row.get(4)?,
            fps: row.get(5)?,
            clip_name: row.get(6)?,
            description: row.get(7)?,
            location: row.get(8)?,
            time_of_day: row.get(9)?,
            shot_size: row.get(10)?,
            actors: row.get(11)?,
            props: row.get(12)?,
            notes: row.get(13)?,
            audio: row.get(14)?,
            camera: row.get(15)?,
            image_path: row.get(16)?,
            created_by: row.get(17)?,
        })
    }

    fn into_record(self) -> CoreResult<ShotRecord> {
        let corrupt = |field: &str, e: CoreError| {
            CoreError::Database(format!("Shot row {} has invalid {}: {}", self.id, field, e))
        };

        let metadata = ShotMetadata {
            time_of_day: self
                .time_of_day
                .parse()
                .map_err(|e| corrupt("time_of_day", e))?,
            shot_size: self
                .shot_size
                .parse()
                .map_err(|e| corrupt("shot_size", e))?,
            audio: self.audio.parse().map_err(|e| corrupt("audio", e))?,
            description: self.description,
            location: self.location,
            actors: self.actors,
            props: self.props,
            notes: self.notes,
            camera: self.camera,
            image_path: self.image_path,
            created_by: self.created_by,
        };

        Ok(ShotRecord {
            key: self.key,
            duration: self.duration,
            fps: self.fps,
            clip_name: self.clip_name,
            metadata,
        })
    }
}

/// Validates `record` and returns a copy with a canonical clip name
fn normalized(record: &ShotRecord) -> CoreResult<ShotRecord> {
    record.validate()?;
    let mut record = record.clone();
    if let Some(clip) = clip_file_name(&record.clip_name) {
        record.clip_name = clip;
    }
    Ok(record)
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _) if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

// =============================================================================
// Tests
// =============================================================================
