//! Query helpers for extracting data from loaded runs.

use sl_core::units::{Length, m, mps, to_ft, to_mph};
use sl_sim::TelemetryRow;
use uom::si::length::{foot, meter};

use crate::error::{AppError, AppResult};

/// Length of the reference straight (ft).
pub const STRAIGHT_LENGTH_FT: f64 = 3300.0;

/// Reference straight length as a typed quantity.
pub fn straight_length() -> Length {
    Length::new::<foot>(STRAIGHT_LENGTH_FT)
}

/// Summary of a run's time range and final kinematics.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub time_range: (f64, f64),
    pub row_count: usize,
    pub final_speed_mps: f64,
    pub final_speed_mph: f64,
    pub distance_m: f64,
    pub distance_ft: f64,
    /// Union of telemetry keys, in export column order
    pub keys: Vec<String>,
}

/// Get run summary from telemetry rows.
pub fn summarize(rows: &[TelemetryRow]) -> AppResult<RunSummary> {
    let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
        return Err(AppError::InvalidInput("No rows in run".to_string()));
    };

    let distance_m = last.x - first.x;

    Ok(RunSummary {
        time_range: (first.t, last.t),
        row_count: rows.len(),
        final_speed_mps: last.v,
        final_speed_mph: to_mph(mps(last.v)),
        distance_m,
        distance_ft: to_ft(m(distance_m)),
        keys: sl_results::column_keys(rows),
    })
}

/// Extract `(t, value)` pairs for a telemetry key. Rows lacking the key are
/// skipped.
pub fn extract_series(rows: &[TelemetryRow], key: &str) -> AppResult<Vec<(f64, f64)>> {
    let series: Vec<(f64, f64)> = rows
        .iter()
        .filter_map(|row| row.get(key).map(|value| (row.t, value)))
        .collect();

    if series.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "Unknown telemetry key: {}",
            key
        )));
    }
    Ok(series)
}

/// Time of the first row at or beyond `x_m`, or `None` if the run never gets
/// there.
pub fn time_to_distance(rows: &[TelemetryRow], x_m: f64) -> Option<f64> {
    rows.iter().find(|row| row.x >= x_m).map(|row| row.t)
}

/// Time at which the vehicle first covers the reference straight.
pub fn time_to_end_of_straight(rows: &[TelemetryRow]) -> Option<f64> {
    let start = rows.first().map(|row| row.x)?;
    time_to_distance(rows, start + straight_length().get::<meter>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sl_sim::{DriverInputs, Extras, VehicleState};

    fn row(t: f64, x: f64, v: f64) -> TelemetryRow {
        let state = VehicleState { t, x, v, a: 0.0 };
        let mut extras = Extras::new();
        if t > 0.0 {
            extras.insert("power_W", 1200.0);
        }
        TelemetryRow::from_step(&state, DriverInputs::full_throttle(), extras)
    }

    fn rows() -> Vec<TelemetryRow> {
        vec![row(0.0, 0.0, 0.0), row(1.0, 5.0, 10.0), row(2.0, 20.0, 20.0)]
    }

    #[test]
    fn summary_converts_units() {
        let s = summarize(&rows()).unwrap();
        assert_eq!(s.time_range, (0.0, 2.0));
        assert_eq!(s.row_count, 3);
        assert_eq!(s.final_speed_mps, 20.0);
        assert!((s.final_speed_mph - 44.738_725_8).abs() < 1e-6);
        assert_eq!(s.distance_m, 20.0);
        assert!((s.distance_ft - 65.616_797_9).abs() < 1e-6);
        assert_eq!(s.keys.last().map(String::as_str), Some("power_W"));
    }

    #[test]
    fn summary_of_nothing_is_an_error() {
        assert!(matches!(summarize(&[]), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn series_skips_rows_without_key() {
        let series = extract_series(&rows(), "power_W").unwrap();
        assert_eq!(series, vec![(1.0, 1200.0), (2.0, 1200.0)]);

        let speed = extract_series(&rows(), "v_mps").unwrap();
        assert_eq!(speed.len(), 3);

        assert!(extract_series(&rows(), "F_grade_N").is_err());
    }

    #[test]
    fn first_time_past_a_distance() {
        assert_eq!(time_to_distance(&rows(), 5.0), Some(1.0));
        assert_eq!(time_to_distance(&rows(), 6.0), Some(2.0));
        assert_eq!(time_to_distance(&rows(), 100.0), None);
    }

    #[test]
    fn straight_is_about_a_kilometre() {
        assert!((straight_length().get::<meter>() - 1005.84).abs() < 1e-9);
    }

    #[test]
    fn end_of_straight_is_measured_from_the_start() {
        let rows = vec![row(0.0, 10.0, 30.0), row(30.0, 900.0, 30.0), row(40.0, 1016.0, 30.0)];
        assert_eq!(time_to_end_of_straight(&rows), Some(40.0));
        assert_eq!(time_to_end_of_straight(&rows[..2]), None);
        assert_eq!(time_to_end_of_straight(&[]), None);
    }
}
