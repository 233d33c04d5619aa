//! EDL event model and line rendering.

use std::fmt::{self, Write};

use serde::{Deserialize, Serialize};

use crate::core::timecode::Timecode;

/// Reel column written on every event line
pub const SOURCE_REEL: &str = "AX";

/// Audio channels activated on each audio event (A1..A8)
pub const AUDIO_CHANNELS: u32 = 8;

/// Cut transition code
const CUT: &str = "C";

/// Track an event is cut on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackType {
    Video,
    Audio,
}

impl TrackType {
    /// Channel code as it appears in the event line
    pub fn code(&self) -> &'static str {
        match self {
            Self::Video => "V",
            Self::Audio => "AA",
        }
    }
}

/// One numbered cut event.
///
/// Source and record timecodes are the same range: shots are assembled flat,
/// without retiming.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdlEvent {
    pub number: u32,
    pub track: TrackType,
    pub record_in: Timecode,
    pub record_out: Timecode,
    /// Clip file name annotated below the event (`{reel}.mov`)
    pub clip_name: String,
}

impl EdlEvent {
    pub fn new(
        number: u32,
        track: TrackType,
        record_in: Timecode,
        record_out: Timecode,
        clip_name: &str,
    ) -> Self {
        Self {
            number,
            track,
            record_in,
            record_out,
            clip_name: clip_name.to_string(),
        }
    }

    /// Writes the event line and its comment block.
    ///
    /// Audio events additionally carry per-channel level comments, the `AUD`
    /// channel directive and a trailing blank line.
    pub fn write_to<W: Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(out, "{}", self)?;
        writeln!(out, "* FROM CLIP NAME: {}", self.clip_name)?;

        if self.track == TrackType::Audio {
            for channel in 1..=AUDIO_CHANNELS {
                writeln!(
                    out,
                    "* AUDIO LEVEL AT {} IS -0.00 DB  (REEL {} A{})",
                    Timecode::ZERO,
                    SOURCE_REEL,
                    channel
                )?;
            }

            let channels: Vec<String> = (1..=AUDIO_CHANNELS).map(|c| c.to_string()).collect();
            writeln!(out, "AUD  {}", channels.join(" "))?;
            writeln!(out)?;
        }

        Ok(())
    }
}

impl fmt::Display for EdlEvent {
    /// Fixed-column event line, e.g.
    /// `001  AX       V     C        00:00:00:00 00:00:05:00 00:00:00:00 00:00:05:00`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:03}  {:<9}{:<6}{:<9}{} {} {} {}",
            self.number,
            SOURCE_REEL,
            self.track.code(),
            CUT,
            self.record_in,
            self.record_out,
            self.record_in,
            self.record_out
        )
    }
}
