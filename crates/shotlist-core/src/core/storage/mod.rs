//! Shot Storage Module
//!
//! Persists shot records per project and manages reference stills.

pub mod db;
pub mod images;

pub use db::{ProjectSummary, ShotDb};
pub use images::ImageStore;

use serde::{Deserialize, Serialize};

use crate::core::fs::validate_path_component;
use crate::core::{AudioMode, CoreResult, ShotRecord, ShotSize, TimeOfDay};

/// Checks a project name and returns it without surrounding whitespace.
///
/// The name doubles as a file name for exports and the image directory, so it
/// must be a single path component.
pub fn validate_project_name(name: &str) -> CoreResult<&str> {
    let trimmed = name.trim();
    validate_path_component(trimmed, "Project name")?;
    Ok(trimmed)
}

/// Partial update of a stored shot; `None` leaves a field untouched
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShotPatch {
    pub duration: Option<u32>,
    pub fps: Option<u32>,
    pub clip_name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub time_of_day: Option<TimeOfDay>,
    pub shot_size: Option<ShotSize>,
    pub actors: Option<String>,
    pub props: Option<String>,
    pub notes: Option<String>,
    pub audio: Option<AudioMode>,
    pub camera: Option<String>,
}

impl ShotPatch {
    /// Returns true if no field is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Writes every set field into `record`
    pub fn apply(&self, record: &mut ShotRecord) {
        if let Some(duration) = self.duration {
            record.duration = duration;
        }
        if let Some(fps) = self.fps {
            record.fps = fps;
        }
        if let Some(clip_name) = &self.clip_name {
            record.clip_name = clip_name.clone();
        }

        let meta = &mut record.metadata;
        if let Some(description) = &self.description {
            meta.description = description.clone();
        }
        if let Some(location) = &self.location {
            meta.location = location.clone();
        }
        if let Some(time_of_day) = self.time_of_day {
            meta.time_of_day = time_of_day;
        }
        if let Some(shot_size) = self.shot_size {
            meta.shot_size = shot_size;
        }
        if let Some(actors) = &self.actors {
            meta.actors = actors.clone();
        }
        if let Some(props) = &self.props {
            meta.props = props.clone();
        }
        if let Some(notes) = &self.notes {
            meta.notes = notes.clone();
        }
        if let Some(audio) = self.audio {
            meta.audio = audio;
        }
        if let Some(camera) = &self.camera {
            meta.camera = camera.clone();
        }
    }
}
