use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use sl_app::{AppResult, RunOptions, RunRequest, query, run_service};

#[derive(Parser)]
#[command(name = "sl-cli")]
#[command(about = "Straightline CLI - longitudinal vehicle simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a scenario file
    Validate {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
    },
    /// Run a scenario, reusing a cached result when one exists
    Run {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
        /// Time step in seconds (overrides the scenario)
        #[arg(long)]
        dt: Option<f64>,
        /// End time in seconds (overrides the scenario)
        #[arg(long)]
        t_end: Option<f64>,
    },
    /// List cached runs for a scenario
    Runs {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
    },
    /// Show details of a cached run
    ShowRun {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
        /// Run ID to display
        run_id: String,
    },
    /// Export one telemetry series from a run
    ExportSeries {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
        /// Run ID
        run_id: String,
        /// Telemetry key (e.g., v_mps, x_m, F_drive_N)
        key: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Run {
            scenario_path,
            no_cache,
            dt,
            t_end,
        } => cmd_run(&scenario_path, !no_cache, dt, t_end),
        Commands::Runs { scenario_path } => cmd_runs(&scenario_path),
        Commands::ShowRun {
            scenario_path,
            run_id,
        } => cmd_show_run(&scenario_path, &run_id),
        Commands::ExportSeries {
            scenario_path,
            run_id,
            key,
            output,
        } => cmd_export_series(&scenario_path, &run_id, &key, output.as_deref()),
    }
}

fn cmd_validate(scenario_path: &Path) -> AppResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let scenario = sl_project::load(scenario_path)?;
    println!(
        "✓ Scenario '{}' is valid ({} model, {} controller)",
        scenario.name,
        scenario.model.kind(),
        scenario.controller.kind()
    );
    Ok(())
}

fn cmd_run(
    scenario_path: &Path,
    use_cache: bool,
    dt_s: Option<f64>,
    t_end_s: Option<f64>,
) -> AppResult<()> {
    println!("Running scenario: {}", scenario_path.display());

    let request = RunRequest {
        scenario_path,
        options: RunOptions {
            use_cache,
            dt_s,
            t_end_s,
            ..RunOptions::default()
        },
    };

    let response = run_service::ensure_run(&request)?;

    if response.loaded_from_cache {
        println!("✓ Loaded cached run: {}", response.run_id);
    } else {
        println!(
            "✓ Run complete: {} ({} rows in {:.3} s)",
            response.run_id, response.manifest.rows, response.elapsed_s
        );
    }
    Ok(())
}

fn cmd_runs(scenario_path: &Path) -> AppResult<()> {
    let runs = run_service::list_runs(scenario_path)?;

    if runs.is_empty() {
        println!("No cached runs found for: {}", scenario_path.display());
    } else {
        println!("Cached runs for '{}':", runs[0].scenario);
        for manifest in runs {
            println!(
                "  {} ({}, dt={} s, t_end={} s)",
                manifest.run_id, manifest.timestamp, manifest.dt_s, manifest.t_end_s
            );
        }
    }
    Ok(())
}

fn cmd_show_run(scenario_path: &Path, run_id: &str) -> AppResult<()> {
    println!("Loading run: {}", run_id);

    let (manifest, history) = run_service::load_run(scenario_path, run_id)?;
    let summary = query::summarize(history.rows())?;

    println!("\nRun Summary:");
    println!("  Scenario: {}", manifest.scenario);
    println!("  Model: {}", manifest.model);
    println!("  Controller: {}", manifest.controller);
    println!("  Rows: {}", summary.row_count);
    println!(
        "  Time range: {:.3} - {:.3} s",
        summary.time_range.0, summary.time_range.1
    );
    println!(
        "  Final speed: {:.2} m/s ({:.1} mph)",
        summary.final_speed_mps, summary.final_speed_mph
    );
    println!(
        "  Distance: {:.1} m ({:.0} ft)",
        summary.distance_m, summary.distance_ft
    );

    match query::time_to_end_of_straight(history.rows()) {
        Some(t) => println!(
            "  End of straight ({} ft): {:.2} s",
            query::STRAIGHT_LENGTH_FT,
            t
        ),
        None => println!(
            "  End of straight ({} ft): not reached",
            query::STRAIGHT_LENGTH_FT
        ),
    }

    println!("\nKeys:");
    for key in &summary.keys {
        println!("  {}", key);
    }

    Ok(())
}

fn cmd_export_series(
    scenario_path: &Path,
    run_id: &str,
    key: &str,
    output: Option<&Path>,
) -> AppResult<()> {
    let (_manifest, history) = run_service::load_run(scenario_path, run_id)?;
    let series = query::extract_series(history.rows(), key)?;

    let csv = sl_results::series_to_csv_string(key, &series)?;

    if let Some(path) = output {
        sl_results::ensure_parent_dir(path)?;
        std::fs::write(path, csv)?;
        println!(
            "✓ Exported {} data points to {}",
            series.len(),
            path.display()
        );
    } else {
        print!("{}", csv);
    }

    Ok(())
}
