//! Shotlist Core Type Definitions
//!
//! Defines the shot record and the small value types it is built from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{CoreError, CoreResult};

// =============================================================================
// ID Types
// =============================================================================

/// Stored shot row identifier (SQLite rowid)
pub type ShotId = i64;

/// Time in seconds (floating point)
pub type TimeSec = f64;

// =============================================================================
// Constants
// =============================================================================

/// Frame rates a shot may be recorded at
pub const SUPPORTED_FPS: [u32; 6] = [25, 30, 50, 60, 100, 120];

/// Container extension appended to every reel in exported clip names
pub const CLIP_EXTENSION: &str = "mov";

/// Operator name used when none is configured
pub const DEFAULT_OPERATOR: &str = "unknown";

/// Camera body used when none is given
pub const DEFAULT_CAMERA: &str = "UrsaMini 4K";

/// Returns true if `fps` is one of [`SUPPORTED_FPS`]
pub fn is_supported_fps(fps: u32) -> bool {
    SUPPORTED_FPS.contains(&fps)
}

// =============================================================================
// Shot Key
// =============================================================================

/// Scene / shot / take triple identifying a shot within a project.
///
/// The derived ordering is lexicographic (scene, then shot, then take), which is
/// the order shots are laid on the EDL timeline.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct ShotKey {
    pub scene: u32,
    pub shot: u32,
    pub take: u32,
}

impl ShotKey {
    pub fn new(scene: u32, shot: u32, take: u32) -> Self {
        Self { scene, shot, take }
    }

    /// All three components must be positive
    pub fn is_valid(&self) -> bool {
        self.scene > 0 && self.shot > 0 && self.take > 0
    }
}

impl fmt::Display for ShotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.scene, self.shot, self.take)
    }
}

impl FromStr for ShotKey {
    type Err = CoreError;

    /// Parses `scene/shot/take`, e.g. `3/1/2`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('/').collect();
        if parts.len() != 3 {
            return Err(CoreError::ValidationError(format!(
                "Expected 'scene/shot/take', got '{}'",
                s
            )));
        }

        let parse = |part: &str, label: &str| -> CoreResult<u32> {
            part.trim().parse::<u32>().map_err(|_| {
                CoreError::ValidationError(format!("Invalid {} number: '{}'", label, part))
            })
        };

        let key = Self::new(
            parse(parts[0], "scene")?,
            parse(parts[1], "shot")?,
            parse(parts[2], "take")?,
        );

        if !key.is_valid() {
            return Err(CoreError::ValidationError(format!(
                "Scene, shot and take must be positive: '{}'",
                s
            )));
        }

        Ok(key)
    }
}

// =============================================================================
// Metadata Enums
// =============================================================================

/// Time of day the shot is set in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    #[default]
    Morning,
    Noon,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 5] = [
        Self::Morning,
        Self::Noon,
        Self::Afternoon,
        Self::Evening,
        Self::Night,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Noon => "noon",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
            Self::Night => "night",
        }
    }
}

/// Camera framing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShotSize {
    #[default]
    Wide,
    MediumWide,
    Medium,
    Close,
    CloseUp,
    Detail,
}

impl ShotSize {
    pub const ALL: [ShotSize; 6] = [
        Self::Wide,
        Self::MediumWide,
        Self::Medium,
        Self::Close,
        Self::CloseUp,
        Self::Detail,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wide => "wide",
            Self::MediumWide => "medium-wide",
            Self::Medium => "medium",
            Self::Close => "close",
            Self::CloseUp => "close-up",
            Self::Detail => "detail",
        }
    }
}

/// Whether production sound was recorded
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioMode {
    #[default]
    On,
    Off,
}

impl AudioMode {
    pub const ALL: [AudioMode; 2] = [Self::On, Self::Off];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

macro_rules! impl_str_enum {
    ($ty:ident, $label:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| {
                        CoreError::ValidationError(format!("Unknown {}: '{}'", $label, s))
                    })
            }
        }
    };
}

impl_str_enum!(TimeOfDay, "time of day");
impl_str_enum!(ShotSize, "shot size");
impl_str_enum!(AudioMode, "audio mode");

// =============================================================================
// Shot Record
// =============================================================================

/// Descriptive fields of a shot. None of these reach the EDL.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShotMetadata {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub time_of_day: TimeOfDay,
    #[serde(default)]
    pub shot_size: ShotSize,
    #[serde(default)]
    pub actors: String,
    #[serde(default)]
    pub props: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub audio: AudioMode,
    #[serde(default = "default_camera")]
    pub camera: String,
    /// Reference still stored next to the database
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default = "default_operator")]
    pub created_by: String,
}

fn default_camera() -> String {
    DEFAULT_CAMERA.to_string()
}

fn default_operator() -> String {
    DEFAULT_OPERATOR.to_string()
}

impl Default for ShotMetadata {
    fn default() -> Self {
        Self {
            description: String::new(),
            location: String::new(),
            time_of_day: TimeOfDay::default(),
            shot_size: ShotSize::default(),
            actors: String::new(),
            props: String::new(),
            notes: String::new(),
            audio: AudioMode::default(),
            camera: default_camera(),
            image_path: None,
            created_by: default_operator(),
        }
    }
}

/// One logged take.
///
/// `duration` is whole seconds on the assembled timeline; `fps` governs the
/// frame field of this record's timecodes only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShotRecord {
    #[serde(flatten)]
    pub key: ShotKey,
    pub duration: u32,
    pub fps: u32,
    pub clip_name: String,
    #[serde(flatten)]
    pub metadata: ShotMetadata,
}

impl ShotRecord {
    /// Creates a record with default metadata
    pub fn new(key: ShotKey, duration: u32, fps: u32, clip_name: &str) -> Self {
        Self {
            key,
            duration,
            fps,
            clip_name: clip_name.to_string(),
            metadata: ShotMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: ShotMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Camera reel identifier (clip name up to the first dot)
    pub fn reel(&self) -> Option<&str> {
        reel_name(&self.clip_name)
    }

    /// Checks everything the EDL emitter relies on
    pub fn validate(&self) -> CoreResult<()> {
        if !self.key.is_valid() {
            return Err(CoreError::invalid_record(
                self.key,
                "scene, shot and take must be positive",
            ));
        }
        if self.duration == 0 {
            return Err(CoreError::invalid_record(
                self.key,
                "duration must be positive",
            ));
        }
        if !is_supported_fps(self.fps) {
            return Err(CoreError::invalid_record(
                self.key,
                format!("unsupported frame rate {} (expected one of {:?})", self.fps, SUPPORTED_FPS),
            ));
        }
        if self.reel().is_none() {
            return Err(CoreError::invalid_record(
                self.key,
                format!("clip name '{}' has no reel stem", self.clip_name),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Clip Names
// =============================================================================

/// Returns the part of `clip_name` before its first `.`, or `None` when that
/// part is blank.
///
/// Surrounding whitespace is stripped from the reel, so `" A001 .mov"` yields
/// `A001` and a whitespace-only stem counts as blank.
pub fn reel_name(clip_name: &str) -> Option<&str> {
    let stem = clip_name.split('.').next().unwrap_or_default().trim();
    if stem.is_empty() {
        None
    } else {
        Some(stem)
    }
}

/// Builds the exported clip file name: `{reel}.mov`
pub fn clip_file_name(clip_name: &str) -> Option<String> {
    reel_name(clip_name).map(|reel| format!("{}.{}", reel, CLIP_EXTENSION))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shot_key_orders_scene_then_shot_then_take() {
        let mut keys = vec![
            ShotKey::new(2, 1, 1),
            ShotKey::new(1, 2, 1),
            ShotKey::new(1, 1, 2),
            ShotKey::new(1, 1, 1),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                ShotKey::new(1, 1, 1),
                ShotKey::new(1, 1, 2),
                ShotKey::new(1, 2, 1),
                ShotKey::new(2, 1, 1),
            ]
        );
    }

    #[test]
    fn test_shot_key_parse() {
        let key: ShotKey = "3/1/12".parse().unwrap();
        assert_eq!(key, ShotKey::new(3, 1, 12));
        assert_eq!(key.to_string(), "3/1/12");

        assert!("3/1".parse::<ShotKey>().is_err());
        assert!("3/x/1".parse::<ShotKey>().is_err());
        assert!("0/1/1".parse::<ShotKey>().is_err());
    }

    #[test]
    fn test_reel_name_keeps_first_segment() {
        assert_eq!(reel_name("A001.mov"), Some("A001"));
        assert_eq!(reel_name("A001.something.mov"), Some("A001"));
        assert_eq!(reel_name("A001"), Some("A001"));
        assert_eq!(reel_name(".mov"), None);
        assert_eq!(reel_name(""), None);
        assert_eq!(reel_name(" A001 .mov"), Some("A001"));
        assert_eq!(reel_name(" .mov"), None);
        assert_eq!(clip_file_name("A001.something.mov").as_deref(), Some("A001.mov"));
    }

    #[test]
    fn test_validate_rejects_bad_records() {
        let key = ShotKey::new(1, 1, 1);
        assert!(ShotRecord::new(key, 5, 25, "A001.mov").validate().is_ok());

        let zero_duration = ShotRecord::new(key, 0, 25, "A001.mov");
        assert!(matches!(
            zero_duration.validate(),
            Err(CoreError::InvalidRecord { .. })
        ));

        let odd_fps = ShotRecord::new(key, 5, 24, "A001.mov");
        assert!(matches!(
            odd_fps.validate(),
            Err(CoreError::InvalidRecord { .. })
        ));

        let no_stem = ShotRecord::new(key, 5, 25, ".mov");
        assert!(matches!(
            no_stem.validate(),
            Err(CoreError::InvalidRecord { .. })
        ));

        let zero_take = ShotRecord::new(ShotKey::new(1, 1, 0), 5, 25, "A001.mov");
        assert!(zero_take.validate().is_err());
    }

    #[test]
    fn test_metadata_enums_parse_case_insensitively() {
        assert_eq!("Night".parse::<TimeOfDay>().unwrap(), TimeOfDay::Night);
        assert_eq!("close-up".parse::<ShotSize>().unwrap(), ShotSize::CloseUp);
        assert_eq!("OFF".parse::<AudioMode>().unwrap(), AudioMode::Off);
        assert!("dusk".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn test_record_serializes_flat() {
        let record = ShotRecord::new(ShotKey::new(1, 2, 3), 5, 25, "A001.mov");
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["scene"], 1);
        assert_eq!(value["take"], 3);
        assert_eq!(value["clipName"], "A001.mov");
        assert_eq!(value["timeOfDay"], "morning");
        assert_eq!(value["shotSize"], "wide");

        let back: ShotRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }
}
