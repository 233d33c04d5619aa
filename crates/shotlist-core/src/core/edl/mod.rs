//! Edit Decision List Module
//!
//! Builds a CMX-style EDL from an ordered list of shots:
//! one video event and one audio event per shot, laid end to end.
//!
//! # Example
//!
//! ```rust
//! use shotlist_core::core::{edl::emit_edl, ShotKey, ShotRecord};
//!
//! let records = vec![ShotRecord::new(ShotKey::new(1, 1, 1), 5, 25, "A001.mov")];
//! let text = emit_edl("Pilot", &records).unwrap();
//! assert!(text.starts_with("TITLE: Pilot\n"));
//! ```

mod models;
mod writer;

pub use models::{EdlEvent, TrackType, AUDIO_CHANNELS, SOURCE_REEL};
pub use writer::{emit_edl, write_edl, FRAME_CODE_MODE};
