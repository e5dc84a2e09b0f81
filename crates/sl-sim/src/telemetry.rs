//! Telemetry rows and run history.
//!
//! A row is the fixed kinematic core (`t, x, v, a, throttle, brake`) plus an
//! open, insertion-ordered map of model-specific extras. Keys that a row does
//! not carry are absent, never zero.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::controller::DriverInputs;
use crate::state::VehicleState;

/// Stable names of the core telemetry fields.
pub mod keys {
    pub const T: &str = "t";
    pub const X: &str = "x_m";
    pub const V: &str = "v_mps";
    pub const A: &str = "a_mps2";
    pub const THROTTLE: &str = "throttle";
    pub const BRAKE: &str = "brake";

    /// Core keys in column order.
    pub const CORE: [&str; 6] = [T, X, V, A, THROTTLE, BRAKE];

    /// Prefix given to an extra whose name collides with a core key.
    pub const SHADOW_PREFIX: &str = "extra.";

    pub fn is_core(key: &str) -> bool {
        CORE.iter().any(|k| *k == key)
    }
}

/// Named auxiliary quantities returned by a model step, in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Extras(Vec<(String, f64)>);

impl Extras {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Insert a value, replacing an existing key in place.
    ///
    /// A core key (`t`, `x_m`, ...) is stored as `extra.<key>` so it can never
    /// shadow the row's own kinematics.
    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        let mut key = key.into();
        if keys::is_core(&key) {
            key.insert_str(0, keys::SHADOW_PREFIX);
        }
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Extras {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut extras = Extras::new();
        for (k, v) in iter {
            extras.insert(k, v);
        }
        extras
    }
}

/// One timestamped observation: post-step kinematics, the commands that
/// produced them, and whatever the model reported along the way.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TelemetryRow {
    pub t: f64,
    pub x: f64,
    pub v: f64,
    pub a: f64,
    pub throttle: f64,
    pub brake: f64,
    pub extras: Extras,
}

impl TelemetryRow {
    /// Pre-integration snapshot: zero commands, no extras.
    pub fn initial(state: &VehicleState) -> Self {
        Self {
            t: state.t,
            x: state.x,
            v: state.v,
            a: state.a,
            throttle: 0.0,
            brake: 0.0,
            extras: Extras::new(),
        }
    }

    /// Row for a completed step. `state` must already be advanced.
    pub fn from_step(state: &VehicleState, inputs: DriverInputs, extras: Extras) -> Self {
        Self {
            t: state.t,
            x: state.x,
            v: state.v,
            a: state.a,
            throttle: inputs.throttle,
            brake: inputs.brake,
            extras,
        }
    }

    /// Look up a core field or an extra by its telemetry key.
    pub fn get(&self, key: &str) -> Option<f64> {
        match key {
            keys::T => Some(self.t),
            keys::X => Some(self.x),
            keys::V => Some(self.v),
            keys::A => Some(self.a),
            keys::THROTTLE => Some(self.throttle),
            keys::BRAKE => Some(self.brake),
            other => self.extras.get(other),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        keys::is_core(key) || self.extras.contains_key(key)
    }

    /// Core keys first, then extras in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        let core: [&str; 6] = keys::CORE;
        core.into_iter().chain(self.extras.keys())
    }

    /// `(key, value)` pairs in the same order as [`keys`](Self::keys).
    pub fn fields(&self) -> impl Iterator<Item = (&str, f64)> {
        let names: [&str; 6] = keys::CORE;
        let values = [self.t, self.x, self.v, self.a, self.throttle, self.brake];
        names.into_iter().zip(values).chain(self.extras.iter())
    }
}

impl Serialize for TelemetryRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(keys::CORE.len() + self.extras.len()))?;
        for (k, v) in self.fields() {
            map.serialize_entry(k, &v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TelemetryRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RowVisitor)
    }
}

struct RowVisitor;

impl<'de> Visitor<'de> for RowVisitor {
    type Value = TelemetryRow;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of telemetry field names to numbers")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut core: [Option<f64>; 6] = [None; 6];
        let mut extras = Extras::new();

        while let Some((key, value)) = access.next_entry::<String, f64>()? {
            match keys::CORE.iter().position(|k| *k == key) {
                Some(i) if core[i].is_some() => {
                    return Err(de::Error::duplicate_field(keys::CORE[i]));
                }
                Some(i) => core[i] = Some(value),
                None => extras.insert(key, value),
            }
        }

        let take = |i: usize| -> Result<f64, A::Error> {
            core[i].ok_or_else(|| de::Error::missing_field(keys::CORE[i]))
        };
        Ok(TelemetryRow {
            t: take(0)?,
            x: take(1)?,
            v: take(2)?,
            a: take(3)?,
            throttle: take(4)?,
            brake: take(5)?,
            extras,
        })
    }
}

/// Ordered telemetry of one run. The first row is the pre-integration snapshot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    rows: Vec<TelemetryRow>,
}

impl History {
    pub fn from_rows(rows: Vec<TelemetryRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[TelemetryRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<TelemetryRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&TelemetryRow> {
        self.rows.first()
    }

    pub fn last(&self) -> Option<&TelemetryRow> {
        self.rows.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TelemetryRow> {
        self.rows.iter()
    }

    /// `(t, value)` pairs for every row that carries `key`.
    pub fn series(&self, key: &str) -> Vec<(f64, f64)> {
        self.rows
            .iter()
            .filter_map(|row| row.get(key).map(|v| (row.t, v)))
            .collect()
    }

    /// Rows up to and including the first one at or past `x_m`.
    ///
    /// Returns every row if the position is never reached.
    pub fn until_position(&self, x_m: f64) -> &[TelemetryRow] {
        match self.rows.iter().position(|row| row.x >= x_m) {
            Some(i) => &self.rows[..=i],
            None => &self.rows,
        }
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a TelemetryRow;
    type IntoIter = std::slice::Iter<'a, TelemetryRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_at(t: f64, x: f64) -> TelemetryRow {
        TelemetryRow {
            t,
            x,
            ..TelemetryRow::default()
        }
    }

    #[test]
    fn extras_insert_replaces_in_place() {
        let mut e = Extras::new();
        e.insert("b", 1.0);
        e.insert("a", 2.0);
        e.insert("b", 3.0);
        let keys: Vec<_> = e.keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(e.get("b"), Some(3.0));
        assert_eq!(e.len(), 2);
    }

    #[test]
    fn row_get_resolves_core_and_extras() {
        let extras: Extras = [("power_W", 1200.0)].into_iter().collect();
        let state = VehicleState {
            t: 0.5,
            x: 1.0,
            v: 2.0,
            a: 3.0,
        };
        let row = TelemetryRow::from_step(&state, DriverInputs::new(1.0, 0.0), extras);
        assert_eq!(row.get("t"), Some(0.5));
        assert_eq!(row.get("v_mps"), Some(2.0));
        assert_eq!(row.get("power_W"), Some(1200.0));
        assert_eq!(row.get("F_drag_N"), None);
        assert_eq!(row.keys().count(), 7);
    }

    #[test]
    fn initial_row_has_no_extras() {
        let row = TelemetryRow::initial(&VehicleState::at_rest());
        assert!(row.extras.is_empty());
        assert_eq!(row.throttle, 0.0);
        assert_eq!(row.brake, 0.0);
    }

    #[test]
    fn row_json_omits_absent_keys() {
        let row = TelemetryRow::initial(&VehicleState::at_rest());
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(
            json,
            r#"{"t":0.0,"x_m":0.0,"v_mps":0.0,"a_mps2":0.0,"throttle":0.0,"brake":0.0}"#
        );
    }

    #[test]
    fn row_json_preserves_extras_order() {
        let json = r#"{"t":1.0,"x_m":2.0,"v_mps":3.0,"a_mps2":0.1,"throttle":1.0,"brake":0.0,"z":1.0,"a":2.0}"#;
        let row: TelemetryRow = serde_json::from_str(json).unwrap();
        let extras: Vec<_> = row.extras.keys().collect();
        assert_eq!(extras, vec!["z", "a"]);
        assert_eq!(row.x, 2.0);
    }

    #[test]
    fn row_json_requires_core_keys() {
        let json = r#"{"t":1.0,"x_m":2.0}"#;
        let err = serde_json::from_str::<TelemetryRow>(json).unwrap_err();
        assert!(err.to_string().contains("v_mps"));
    }

    #[test]
    fn extras_cannot_shadow_core_keys() {
        let extras: Extras = [("t", 99.0), ("v_mps", -1.0), ("power_W", 5.0)]
            .into_iter()
            .collect();
        let keys: Vec<_> = extras.keys().collect();
        assert_eq!(keys, vec!["extra.t", "extra.v_mps", "power_W"]);

        let state = VehicleState {
            t: 0.1,
            x: 0.2,
            v: 2.0,
            a: 20.0,
        };
        let row = TelemetryRow::from_step(&state, DriverInputs::full_throttle(), extras);
        assert_eq!(row.get("t"), Some(0.1));
        assert_eq!(row.get("extra.t"), Some(99.0));

        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json.matches("\"t\":").count(), 1);
        let back: TelemetryRow = serde_json::from_str(&json).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn row_json_rejects_repeated_core_key() {
        let json = r#"{"t":0.1,"x_m":0.0,"v_mps":0.0,"a_mps2":0.0,"throttle":0.0,"brake":0.0,"t":99.0}"#;
        let err = serde_json::from_str::<TelemetryRow>(json).unwrap_err();
        assert!(err.to_string().contains("duplicate field"));
    }

    #[test]
    fn until_position_cuts_after_first_crossing() {
        let history = History::from_rows(vec![
            row_at(0.0, 0.0),
            row_at(1.0, 4.0),
            row_at(2.0, 10.0),
            row_at(3.0, 20.0),
        ]);
        assert_eq!(history.until_position(5.0).len(), 3);
        assert_eq!(history.until_position(100.0).len(), 4);
        assert_eq!(history.until_position(0.0).len(), 1);
    }

    #[test]
    fn series_skips_rows_without_key() {
        let mut second = row_at(1.0, 1.0);
        second.extras.insert("power_W", 600.0);
        let history = History::from_rows(vec![row_at(0.0, 0.0), second]);
        assert_eq!(history.series("power_W"), vec![(1.0, 600.0)]);
        assert_eq!(history.series("t").len(), 2);
    }
}
