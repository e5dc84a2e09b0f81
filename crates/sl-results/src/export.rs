//! Telemetry export to CSV and JSON.
//!
//! Rows may carry different extras. CSV output (via the `csv` writer) is made
//! rectangular over the union of all keys with empty cells where a row lacks a
//! key. JSON output keeps each row's own keys.

use std::fs;
use std::io;
use std::path::Path;

use sl_sim::TelemetryRow;

use crate::{ResultsError, ResultsResult};

/// Leading columns, kept in this order when present in any row.
pub const PREFERRED_COLUMNS: [&str; 9] = [
    "t",
    "x_m",
    "v_mps",
    "a_mps2",
    "throttle",
    "brake",
    "power_W",
    "F_drive_N",
    "F_rr_N",
];

/// Union of keys over all rows: preferred columns first, then the rest in
/// first-seen order.
pub fn column_keys(rows: &[TelemetryRow]) -> Vec<String> {
    let mut columns: Vec<String> = PREFERRED_COLUMNS
        .iter()
        .filter(|key| rows.iter().any(|row| row.contains_key(key)))
        .map(|key| key.to_string())
        .collect();

    for row in rows {
        for key in row.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.to_string());
            }
        }
    }
    columns
}

/// Write rows as CSV over [`column_keys`], leaving absent keys as empty fields.
pub fn write_csv<W: io::Write>(rows: &[TelemetryRow], writer: W) -> ResultsResult<()> {
    if rows.is_empty() {
        return Err(ResultsError::EmptyHistory);
    }

    let columns = column_keys(rows);
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&columns)?;

    for row in rows {
        wtr.write_record(columns.iter().map(|key| match row.get(key) {
            Some(value) => value.to_string(),
            None => String::new(),
        }))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_csv_string(rows: &[TelemetryRow]) -> ResultsResult<String> {
    let mut buf = Vec::new();
    write_csv(rows, &mut buf)?;
    utf8(buf)
}

/// Two-column `t,<key>` CSV for one extracted series.
pub fn series_to_csv_string(key: &str, series: &[(f64, f64)]) -> ResultsResult<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["t", key])?;
    for (t, value) in series {
        wtr.write_record([t.to_string(), value.to_string()])?;
    }
    let buf = wtr
        .into_inner()
        .map_err(|e| ResultsError::Io(e.into_error()))?;
    utf8(buf)
}

fn utf8(buf: Vec<u8>) -> ResultsResult<String> {
    String::from_utf8(buf)
        .map_err(|e| ResultsError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

pub fn to_json_string(rows: &[TelemetryRow]) -> ResultsResult<String> {
    if rows.is_empty() {
        return Err(ResultsError::EmptyHistory);
    }
    Ok(serde_json::to_string_pretty(rows)?)
}

pub fn save_csv(rows: &[TelemetryRow], path: &Path) -> ResultsResult<()> {
    let content = to_csv_string(rows)?;
    ensure_parent_dir(path)?;
    fs::write(path, content)?;
    Ok(())
}

pub fn save_json(rows: &[TelemetryRow], path: &Path) -> ResultsResult<()> {
    let content = to_json_string(rows)?;
    ensure_parent_dir(path)?;
    fs::write(path, content)?;
    Ok(())
}

/// Create the directory that will hold `path`, if any.
pub fn ensure_parent_dir(path: &Path) -> ResultsResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
