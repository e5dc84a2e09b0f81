//! Shared application service layer for straightline.
//!
//! This crate sits between the CLI and the backend crates, centralizing
//! scenario compilation, simulation execution with run caching, and result
//! querying.

pub mod compile;
pub mod error;
pub mod query;
pub mod run_service;

// Re-export key types for convenience
pub use compile::{build_controller, build_model, initial_state};
pub use error::{AppError, AppResult};
pub use query::{
    RunSummary, extract_series, summarize, time_to_distance, time_to_end_of_straight,
};
pub use run_service::{
    RunOptions, RunRequest, RunResponse, ensure_run, list_runs, load_run, simulate,
};
