//! Result data types.

use serde::{Deserialize, Serialize};
use sl_project::schema::Scenario;

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    pub run_id: RunId,
    /// Scenario name the run was produced from
    pub scenario: String,
    /// RFC 3339, UTC
    pub timestamp: String,
    pub model: String,
    pub controller: String,
    pub dt_s: f64,
    pub t_end_s: f64,
    pub rows: usize,
    pub engine_version: String,
}

impl RunManifest {
    /// Manifest for a run of `scenario` stamped with the current time.
    pub fn for_scenario(
        run_id: RunId,
        scenario: &Scenario,
        rows: usize,
        engine_version: &str,
    ) -> Self {
        Self {
            run_id,
            scenario: scenario.name.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            model: scenario.model.kind().to_string(),
            controller: scenario.controller.kind().to_string(),
            dt_s: scenario.run.dt_s,
            t_end_s: scenario.run.t_end_s,
            rows,
            engine_version: engine_version.to_string(),
        }
    }
}
