//! EDL emission: header, running timeline and paired events.

use std::fmt::Write;

use tracing::debug;

use super::models::{EdlEvent, TrackType};
use crate::core::timecode::Timecode;
use crate::core::{clip_file_name, CoreError, CoreResult, ShotRecord};

/// Frame code mode declared in the header
pub const FRAME_CODE_MODE: &str = "NON-DROP FRAME";

/// Renders the EDL for `project_name` as a string.
///
/// `records` must already be ordered by scene, shot and take. Every record is
/// validated and the order is checked before any text is produced, so a bad
/// input never yields a partial list. An empty slice gives a header-only EDL.
pub fn emit_edl(project_name: &str, records: &[ShotRecord]) -> CoreResult<String> {
    let mut output = String::new();
    write_edl(&mut output, project_name, records)?;
    Ok(output)
}

/// Streams the EDL for `project_name` into `out`.
///
/// Same contract as [`emit_edl`]; nothing is written when validation fails.
pub fn write_edl<W: Write>(
    out: &mut W,
    project_name: &str,
    records: &[ShotRecord],
) -> CoreResult<()> {
    check_records(records)?;

    write_header(out, project_name).map_err(fmt_error)?;

    let mut elapsed: u64 = 0;
    let mut event_number: u32 = 1;

    for record in records {
        let start = elapsed;
        let end = start + u64::from(record.duration);

        let start_tc = Timecode::from_seconds(start as f64, record.fps);
        let end_tc = Timecode::from_seconds(end as f64, record.fps);

        // check_records guarantees a stem
        let clip = clip_file_name(&record.clip_name).unwrap_or_default();

        for track in [TrackType::Video, TrackType::Audio] {
            EdlEvent::new(event_number, track, start_tc, end_tc, &clip)
                .write_to(out)
                .map_err(fmt_error)?;
            event_number += 1;
        }

        elapsed = end;
    }

    debug!(
        "Emitted EDL for '{}': {} events, {} s",
        project_name,
        event_number - 1,
        elapsed
    );

    Ok(())
}

fn write_header<W: Write>(out: &mut W, project_name: &str) -> std::fmt::Result {
    writeln!(out, "TITLE: {}", project_name)?;
    writeln!(out, "FCM: {}", FRAME_CODE_MODE)?;
    writeln!(out)
}

/// Validates every record and the ascending key order
fn check_records(records: &[ShotRecord]) -> CoreResult<()> {
    for record in records {
        record.validate()?;
    }

    for pair in records.windows(2) {
        if pair[1].key < pair[0].key {
            return Err(CoreError::UnsortedRecords {
                previous: pair[0].key,
                next: pair[1].key,
            });
        }
    }

    Ok(())
}

fn fmt_error(e: std::fmt::Error) -> CoreError {
    CoreError::Internal(format!("Failed to format EDL: {}", e))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timecode::to_timecode;
    use crate::core::ShotKey;

    fn record(scene: u32, shot: u32, take: u32, duration: u32, fps: u32, clip: &str) -> ShotRecord {
        ShotRecord::new(ShotKey::new(scene, shot, take), duration, fps, clip)
    }

    fn event_lines(edl: &str) -> Vec<&str> {
        edl.lines()
            .filter(|l| l.chars().next().is_some_and(|c| c.is_ascii_digit()))
            .collect()
    }

    #[test]
    fn test_empty_project_is_header_only() {
        let edl = emit_edl("Pilot", &[]).unwrap();
        assert_eq!(edl, "TITLE: Pilot\nFCM: NON-DROP FRAME\n\n");
    }

    #[test]
    fn test_pilot_scenario() {
        let records = vec![
            record(1, 1, 1, 5, 25, "A001.mov"),
            record(1, 1, 2, 3, 25, "A002.mov"),
        ];
        let edl = emit_edl("Pilot", &records).unwrap();

        let expected = "\
TITLE: Pilot
FCM: NON-DROP FRAME

001  AX       V     C        00:00:00:00 00:00:05:00 00:00:00:00 00:00:05:00
* FROM CLIP NAME: A001.mov
002  AX       AA    C        00:00:00:00 00:00:05:00 00:00:00:00 00:00:05:00
* FROM CLIP NAME: A001.mov
* AUDIO LEVEL AT 00:00:00:00 IS -0.00 DB  (REEL AX A1)
* AUDIO LEVEL AT 00:00:00:00 IS -0.00 DB  (REEL AX A2)
* AUDIO LEVEL AT 00:00:00:00 IS -0.00 DB  (REEL AX A3)
* AUDIO LEVEL AT 00:00:00:00 IS -0.00 DB  (REEL AX A4)
* AUDIO LEVEL AT 00:00:00:00 IS -0.00 DB  (REEL AX A5)
* AUDIO LEVEL AT 00:00:00:00 IS -0.00 DB  (REEL AX A6)
* AUDIO LEVEL AT 00:00:00:00 IS -0.00 DB  (REEL AX A7)
* AUDIO LEVEL AT 00:00:00:00 IS -0.00 DB  (REEL AX A8)
AUD  1 2 3 4 5 6 7 8

003  AX       V     C        00:00:05:00 00:00:08:00 00:00:05:00 00:00:08:00
* FROM CLIP NAME: A002.mov
004  AX       AA    C        00:00:05:00 00:00:08:00 00:00:05:00 00:00:08:00
* FROM CLIP NAME: A002.mov
* AUDIO LEVEL AT 00:00:00:00 IS -0.00 DB  (REEL AX A1)
* AUDIO LEVEL AT 00:00:00:00 IS -0.00 DB  (REEL AX A2)
* AUDIO LEVEL AT 00:00:00:00 IS -0.00 DB  (REEL AX A3)
* AUDIO LEVEL AT 00:00:00:00 IS -0.00 DB  (REEL AX A4)
* AUDIO LEVEL AT 00:00:00:00 IS -0.00 DB  (REEL AX A5)
* AUDIO LEVEL AT 00:00:00:00 IS -0.00 DB  (REEL AX A6)
* AUDIO LEVEL AT 00:00:00:00 IS -0.00 DB  (REEL AX A7)
* AUDIO LEVEL AT 00:00:00:00 IS -0.00 DB  (REEL AX A8)
AUD  1 2 3 4 5 6 7 8

";
        assert_eq!(edl, expected);
    }

    #[test]
    fn test_event_numbers_are_contiguous() {
        let records: Vec<ShotRecord> = (1..=7)
            .map(|take| record(2, 4, take, take, 50, "B010.mov"))
            .collect();
        let edl = emit_edl("Numbers", &records).unwrap();

        let numbers: Vec<u32> = event_lines(&edl)
            .iter()
            .map(|l| l[..3].parse().unwrap())
            .collect();
        let expected: Vec<u32> = (1..=14).collect();
        assert_eq!(numbers, expected);
    }

    #[test]
    fn test_video_then_audio_per_record() {
        let records = vec![
            record(1, 1, 1, 2, 25, "A001.mov"),
            record(1, 2, 1, 2, 25, "A002.mov"),
        ];
        let edl = emit_edl("Order", &records).unwrap();

        let tracks: Vec<&str> = event_lines(&edl)
            .iter()
            .map(|l| l.split_whitespace().nth(2).unwrap())
            .collect();
        assert_eq!(tracks, vec!["V", "AA", "V", "AA"]);
    }

    #[test]
    fn test_timeline_is_cumulative_with_per_record_fps() {
        let records = vec![
            record(1, 1, 1, 4, 25, "A001.mov"),
            record(1, 1, 2, 9, 60, "A002.mov"),
            record(2, 1, 1, 3600, 30, "A003.mov"),
        ];
        let edl = emit_edl("Cumulative", &records).unwrap();
        let events = event_lines(&edl);

        let start_of = |line: &str| line.split_whitespace().nth(4).unwrap().to_string();
        let end_of = |line: &str| line.split_whitespace().nth(5).unwrap().to_string();

        assert_eq!(start_of(events[2]), to_timecode(4.0, 60));
        assert_eq!(end_of(events[2]), "00:00:13:00");
        assert_eq!(start_of(events[4]), "00:00:13:00");
        assert_eq!(end_of(events[5]), "01:00:13:00");
    }

    #[test]
    fn test_clip_name_uses_first_segment() {
        let records = vec![record(1, 1, 1, 5, 25, "A001.something.mov")];
        let edl = emit_edl("Reel", &records).unwrap();

        assert!(edl.contains("* FROM CLIP NAME: A001.mov\n"));
        assert!(!edl.contains("something"));
    }

    #[test]
    fn test_rejects_unsorted_input() {
        let records = vec![
            record(1, 2, 1, 5, 25, "A001.mov"),
            record(1, 1, 3, 5, 25, "A002.mov"),
        ];
        let result = emit_edl("Unsorted", &records);

        match result {
            Err(CoreError::UnsortedRecords { previous, next }) => {
                assert_eq!(previous, ShotKey::new(1, 2, 1));
                assert_eq!(next, ShotKey::new(1, 1, 3));
            }
            other => panic!("expected UnsortedRecords, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_record_produces_no_output() {
        let records = vec![
            record(1, 1, 1, 5, 25, "A001.mov"),
            record(1, 1, 2, 0, 25, "A002.mov"),
        ];

        let mut out = String::new();
        let result = write_edl(&mut out, "Broken", &records);

        assert!(matches!(result, Err(CoreError::InvalidRecord { .. })));
        assert!(out.is_empty());
    }

    #[test]
    fn test_records_with_equal_keys_are_accepted() {
        let records = vec![
            record(1, 1, 1, 5, 25, "A001.mov"),
            record(1, 1, 1, 5, 25, "A001.mov"),
        ];
        assert!(emit_edl("Dupes", &records).is_ok());
    }
}
