//! Timecode Conversion
//!
//! Converts elapsed seconds into `HH:MM:SS:FF` non-drop-frame timecode.
//!
//! The frame field is derived from the sub-second remainder of the input and
//! always lies in `[0, fps)`. Whole-second input therefore yields `FF == 00`.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::TimeSec;

/// A decomposed timecode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Timecode {
    pub hours: u64,
    pub minutes: u32,
    pub seconds: u32,
    pub frames: u32,
}

impl Timecode {
    /// Zero timecode (`00:00:00:00`)
    pub const ZERO: Self = Self {
        hours: 0,
        minutes: 0,
        seconds: 0,
        frames: 0,
    };

    /// Decomposes `total_seconds` at `fps` frames per second.
    ///
    /// Negative or non-finite input is clamped to zero and a `fps` of zero is
    /// treated as one; both cases log a warning.
    pub fn from_seconds(total_seconds: TimeSec, fps: u32) -> Self {
        let total_seconds = if total_seconds.is_finite() && total_seconds >= 0.0 {
            total_seconds
        } else {
            warn!(
                "Timecode requested for invalid time {}, clamping to 0",
                total_seconds
            );
            0.0
        };

        let fps = if fps == 0 {
            warn!("Timecode requested with zero fps, using 1");
            1
        } else {
            fps
        };

        let hours = (total_seconds / 3600.0).floor();
        let remaining = total_seconds % 3600.0;
        let minutes = (remaining / 60.0).floor();
        let remaining = remaining % 60.0;
        let seconds = remaining.floor();

        let fraction = remaining % 1.0;
        let frames = ((fraction * fps as f64).floor() as u64 % fps as u64) as u32;

        Self {
            hours: hours as u64,
            minutes: minutes as u32,
            seconds: seconds as u32,
            frames,
        }
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds, self.frames
        )
    }
}

/// Formats `total_seconds` as `HH:MM:SS:FF` at `fps`
pub fn to_timecode(total_seconds: TimeSec, fps: u32) -> String {
    Timecode::from_seconds(total_seconds, fps).to_string()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SUPPORTED_FPS;

    #[test]
    fn test_zero_for_every_rate() {
        for fps in SUPPORTED_FPS {
            assert_eq!(to_timecode(0.0, fps), "00:00:00:00");
        }
    }

    #[test]
    fn test_hours_minutes_seconds() {
        assert_eq!(to_timecode(3661.0, 25), "01:01:01:00");
        assert_eq!(to_timecode(59.0, 30), "00:00:59:00");
        assert_eq!(to_timecode(3600.0, 60), "01:00:00:00");
        assert_eq!(to_timecode(86399.0, 25), "23:59:59:00");
    }

    #[test]
    fn test_integral_seconds_have_no_frames() {
        for fps in SUPPORTED_FPS {
            for secs in [1u32, 7, 59, 60, 61, 599, 3599, 3600, 7325] {
                let tc = Timecode::from_seconds(secs as f64, fps);
                assert_eq!(tc.frames, 0, "{} s at {} fps", secs, fps);
            }
        }
    }

    #[test]
    fn test_fractional_seconds() {
        assert_eq!(to_timecode(1.5, 25), "00:00:01:12");
        assert_eq!(to_timecode(10.5, 30), "00:00:10:15");
        assert_eq!(to_timecode(0.25, 100), "00:00:00:25");
    }

    #[test]
    fn test_frames_stay_below_rate() {
        for fps in SUPPORTED_FPS {
            let tc = Timecode::from_seconds(4.0 + 1.0 - 1e-9, fps);
            assert_eq!(tc.seconds, 4);
            assert_eq!(tc.frames, fps - 1);
            assert!(tc.frames < fps);
        }
    }

    #[test]
    fn test_hours_beyond_two_digits() {
        assert_eq!(to_timecode(100.0 * 3600.0, 25), "100:00:00:00");
    }

    #[test]
    fn test_invalid_input_is_clamped() {
        assert_eq!(to_timecode(-5.0, 25), "00:00:00:00");
        assert_eq!(to_timecode(f64::NAN, 25), "00:00:00:00");
        assert_eq!(to_timecode(2.0, 0), "00:00:02:00");
    }
}
