//! Run execution and caching service.

use std::path::Path;
use std::time::Instant;

use sl_project::schema::Scenario;
use sl_results::{RunManifest, RunStore};
use sl_sim::History;
use tracing::info;

use crate::compile;
use crate::error::AppResult;

/// Options for running simulations.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    pub engine_version: String,
    /// Replaces the scenario's step size
    pub dt_s: Option<f64>,
    /// Replaces the scenario's end time
    pub t_end_s: Option<f64>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            dt_s: None,
            t_end_s: None,
        }
    }
}

/// Request to execute a run.
pub struct RunRequest<'a> {
    pub scenario_path: &'a Path,
    pub options: RunOptions,
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub loaded_from_cache: bool,
    pub elapsed_s: f64,
}

/// Execute or load a run based on request.
pub fn ensure_run(request: &RunRequest) -> AppResult<RunResponse> {
    let started = Instant::now();

    let mut scenario = sl_project::load(request.scenario_path)?;
    if let Some(dt_s) = request.options.dt_s {
        scenario.run.dt_s = dt_s;
    }
    if let Some(t_end_s) = request.options.t_end_s {
        scenario.run.t_end_s = t_end_s;
    }
    sl_project::validate_scenario(&scenario)?;

    // Overrides are applied first so they take part in the cache key
    let run_id = sl_results::compute_run_id(&scenario, &request.options.engine_version);
    let store = RunStore::for_scenario(request.scenario_path)?;

    if request.options.use_cache && store.has_run(&run_id) {
        let manifest = store.load_manifest(&run_id)?;
        info!(run_id = %run_id, scenario = %scenario.name, "loaded cached run");
        return Ok(RunResponse {
            run_id,
            manifest,
            loaded_from_cache: true,
            elapsed_s: started.elapsed().as_secs_f64(),
        });
    }

    let history = simulate(&scenario)?;
    let manifest = RunManifest::for_scenario(
        run_id.clone(),
        &scenario,
        history.len(),
        &request.options.engine_version,
    );
    store.save_run(&manifest, &history)?;

    let elapsed_s = started.elapsed().as_secs_f64();
    info!(
        run_id = %run_id,
        scenario = %scenario.name,
        rows = history.len(),
        elapsed_s,
        "saved run"
    );

    Ok(RunResponse {
        run_id,
        manifest,
        loaded_from_cache: false,
        elapsed_s,
    })
}

/// Simulate a scenario without touching the run store.
pub fn simulate(scenario: &Scenario) -> AppResult<History> {
    sl_project::validate_scenario(scenario)?;

    let model = compile::build_model(&scenario.model);
    let controller = compile::build_controller(&scenario.controller);
    let state = compile::initial_state(&scenario.initial);

    let history = sl_sim::run_with_options(&model, state, controller.as_ref(), &scenario.run)?;
    Ok(history)
}

/// List runs stored for a scenario, most recent first.
pub fn list_runs(scenario_path: &Path) -> AppResult<Vec<RunManifest>> {
    let scenario = sl_project::load(scenario_path)?;
    let store = RunStore::for_scenario(scenario_path)?;

    let mut runs = store.list_runs(&scenario.name)?;
    runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(runs)
}

/// Load a specific run.
pub fn load_run(scenario_path: &Path, run_id: &str) -> AppResult<(RunManifest, History)> {
    let store = RunStore::for_scenario(scenario_path)?;

    let manifest = store.load_manifest(run_id)?;
    let history = store.load_telemetry(run_id)?;

    Ok((manifest, history))
}
