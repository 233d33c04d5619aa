//! Command-line definitions.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use shotlist_core::core::{storage::ShotPatch, AudioMode, ShotKey, ShotSize, TimeOfDay};

/// Log film shots and export them as EDL or spreadsheet
#[derive(Debug, Parser)]
#[command(name = "shotlist", version, about)]
pub struct Cli {
    /// Data directory holding the database, images and settings
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List projects with shot counts
    Projects {
        #[arg(long)]
        json: bool,
    },
    /// Log a new shot
    Add(AddArgs),
    /// Change fields of a logged shot
    Update(UpdateArgs),
    /// Show one shot
    Show {
        #[command(flatten)]
        target: ShotTarget,
        #[arg(long)]
        json: bool,
    },
    /// List the shots of a project in timeline order
    List {
        #[arg(short, long)]
        project: String,
        #[arg(long)]
        json: bool,
    },
    /// Remove a shot
    Delete {
        #[command(flatten)]
        target: ShotTarget,
    },
    /// Export a project; the extension (.edl, .xlsx, .csv, .json) picks the format
    Export {
        #[arg(short, long)]
        project: String,
        /// Destination file (defaults to the configured export directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Copy a reference still (jpg, png) into the store and link it to a shot
    AttachImage {
        #[command(flatten)]
        target: ShotTarget,
        image: PathBuf,
    },
    /// Inspect or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// A shot addressed by project and `scene/shot/take`
#[derive(Debug, Args)]
pub struct ShotTarget {
    #[arg(short, long)]
    pub project: String,
    /// Scene/shot/take, e.g. 3/1/2
    pub key: ShotKey,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[command(flatten)]
    pub target: ShotTarget,
    /// Camera clip or reel name; stored as `{reel}.mov`
    #[arg(short, long)]
    pub clip: String,
    /// Seconds (defaults to settings)
    #[arg(short, long)]
    pub duration: Option<u32>,
    /// 25, 30, 50, 60, 100 or 120 (defaults to settings)
    #[arg(long)]
    pub fps: Option<u32>,
    #[command(flatten)]
    pub details: ShotDetails,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub target: ShotTarget,
    #[arg(short, long)]
    pub clip: Option<String>,
    #[arg(short, long)]
    pub duration: Option<u32>,
    #[arg(long)]
    pub fps: Option<u32>,
    #[command(flatten)]
    pub details: ShotDetails,
}

/// Descriptive fields shared by `add` and `update`
#[derive(Debug, Args, Default)]
pub struct ShotDetails {
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    /// morning, noon, afternoon, evening or night
    #[arg(long)]
    pub time_of_day: Option<TimeOfDay>,
    /// wide, medium-wide, medium, close, close-up or detail
    #[arg(long)]
    pub shot_size: Option<ShotSize>,
    #[arg(long)]
    pub actors: Option<String>,
    #[arg(long)]
    pub props: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    /// on or off
    #[arg(long)]
    pub audio: Option<AudioMode>,
    #[arg(long)]
    pub camera: Option<String>,
}

impl UpdateArgs {
    pub fn to_patch(&self) -> ShotPatch {
        let details = &self.details;
        ShotPatch {
            duration: self.duration,
            fps: self.fps,
            clip_name: self.clip.clone(),
            description: details.description.clone(),
            location: details.location.clone(),
            time_of_day: details.time_of_day,
            shot_size: details.shot_size,
            actors: details.actors.clone(),
            props: details.props.clone(),
            notes: details.notes.clone(),
            audio: details.audio,
            camera: details.camera.clone(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective settings
    Show,
    /// Print the settings file location
    Path,
    /// Set a value by dotted key, e.g. `shots.fps 50`
    Set { key: String, value: String },
    /// Restore defaults
    Reset,
}
