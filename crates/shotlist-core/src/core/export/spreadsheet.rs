//! Tabular exports: CSV, Excel and JSON.

use chrono::{DateTime, Utc};
use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook};
use serde::Serialize;

use crate::core::{CoreResult, ShotRecord};

/// Worksheet holding the shots in an Excel export
pub const XLSX_SHEET_NAME: &str = "Shots";

/// Spreadsheet header, in column order
pub const CSV_COLUMNS: [&str; 18] = [
    "scene",
    "shot",
    "take",
    "duration",
    "fps",
    "clip_name",
    "description",
    "location",
    "time_of_day",
    "shot_size",
    "actors",
    "props",
    "notes",
    "audio",
    "camera",
    "image_path",
    "created_by",
    "reel",
];

/// Exports shots as RFC 4180 CSV (CRLF line endings, header row first)
pub fn export_csv(records: &[ShotRecord]) -> String {
    let mut output = String::new();
    push_row(&mut output, CSV_COLUMNS.iter().map(|c| c.to_string()));

    for record in records {
        push_row(&mut output, shot_row(record));
    }

    output
}

/// Exports shots as an Excel workbook with one sheet, header row first.
///
/// Scene, shot, take, duration and fps are written as numbers, the rest as text.
pub fn export_xlsx(records: &[ShotRecord]) -> CoreResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(XLSX_SHEET_NAME)?;

    for (col, name) in CSV_COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as ColNum, *name, &header)?;
    }

    for (index, record) in records.iter().enumerate() {
        let row = index as RowNum + 1;
        let numbers = [
            record.key.scene,
            record.key.shot,
            record.key.take,
            record.duration,
            record.fps,
        ];

        for (col, value) in numbers.iter().enumerate() {
            sheet.write_number(row, col as ColNum, f64::from(*value))?;
        }
        for (col, value) in shot_row(record).into_iter().enumerate().skip(numbers.len()) {
            sheet.write_string(row, col as ColNum, value)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn shot_row(record: &ShotRecord) -> [String; 18] {
    let meta = &record.metadata;
    [
        record.key.scene.to_string(),
        record.key.shot.to_string(),
        record.key.take.to_string(),
        record.duration.to_string(),
        record.fps.to_string(),
        record.clip_name.clone(),
        meta.description.clone(),
        meta.location.clone(),
        meta.time_of_day.to_string(),
        meta.shot_size.to_string(),
        meta.actors.clone(),
        meta.props.clone(),
        meta.notes.clone(),
        meta.audio.to_string(),
        meta.camera.clone(),
        meta.image_path.clone().unwrap_or_default(),
        meta.created_by.clone(),
        record.reel().unwrap_or_default().to_string(),
    ]
}

fn push_row(output: &mut String, fields: impl IntoIterator<Item = String>) {
    let row: Vec<String> = fields.into_iter().map(|f| escape_csv_field(&f)).collect();
    output.push_str(&row.join(","));
    output.push_str("\r\n");
}

/// Quotes a field when it contains a separator, quote or line break
fn escape_csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonExport<'a> {
    project: &'a str,
    exported_at: DateTime<Utc>,
    shots: &'a [ShotRecord],
}

/// Exports shots as a pretty-printed JSON document
pub fn export_json(project: &str, records: &[ShotRecord]) -> CoreResult<String> {
    let document = JsonExport {
        project,
        exported_at: Utc::now(),
        shots: records,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}
