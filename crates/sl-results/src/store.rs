//! Run storage API.
//!
//! Layout: `<root>/<run_id>/{manifest.json, telemetry.csv, telemetry.json}`.

use crate::export;
use crate::types::RunManifest;
use crate::{ResultsError, ResultsResult};
use sl_sim::{History, TelemetryRow};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const MANIFEST_FILE: &str = "manifest.json";
const TELEMETRY_CSV: &str = "telemetry.csv";
const TELEMETRY_JSON: &str = "telemetry.json";

#[derive(Clone, Debug)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    /// Store kept next to a scenario file, under `.straightline/runs`.
    pub fn for_scenario(scenario_path: &Path) -> ResultsResult<Self> {
        let scenario_dir = scenario_path
            .parent()
            .ok_or_else(|| ResultsError::InvalidPath {
                message: "scenario path has no parent directory".to_string(),
            })?;
        let runs_dir = scenario_dir.join(".straightline").join("runs");
        Self::new(runs_dir)
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(run_id)
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_dir(run_id).join(MANIFEST_FILE).exists()
    }

    /// Write telemetry first and the manifest last, so a run only counts as
    /// present once all of its files are on disk.
    pub fn save_run(&self, manifest: &RunManifest, history: &History) -> ResultsResult<()> {
        let run_dir = self.run_dir(&manifest.run_id);
        fs::create_dir_all(&run_dir)?;

        export::save_csv(history.rows(), &run_dir.join(TELEMETRY_CSV))?;
        export::save_json(history.rows(), &run_dir.join(TELEMETRY_JSON))?;

        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(run_dir.join(MANIFEST_FILE), manifest_json)?;

        Ok(())
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        let manifest_path = self.run_dir(run_id).join(MANIFEST_FILE);

        if !manifest_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(manifest_path)?;
        let manifest = serde_json::from_str(&content)?;
        Ok(manifest)
    }

    pub fn load_telemetry(&self, run_id: &str) -> ResultsResult<History> {
        let telemetry_path = self.run_dir(run_id).join(TELEMETRY_JSON);

        if !telemetry_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(telemetry_path)?;
        let rows: Vec<TelemetryRow> = serde_json::from_str(&content)?;
        Ok(History::from_rows(rows))
    }

    /// Runs recorded for a scenario, oldest first.
    pub fn list_runs(&self, scenario: &str) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();

        if !self.root_dir.exists() {
            return Ok(runs);
        }

        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let run_id = entry.file_name().to_string_lossy().to_string();
            match self.load_manifest(&run_id) {
                Ok(manifest) => {
                    if manifest.scenario == scenario {
                        runs.push(manifest);
                    }
                }
                Err(err) => warn!(run_id = %run_id, error = %err, "skipping unreadable run"),
            }
        }

        runs.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(runs)
    }

    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        let run_dir = self.run_dir(run_id);
        if run_dir.exists() {
            fs::remove_dir_all(run_dir)?;
        }
        Ok(())
    }
}
