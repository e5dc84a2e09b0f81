//! Longitudinal vehicle simulation engine.
//!
//! Provides:
//! - `VehicleState`, the kinematic record mutated once per tick
//! - `DynamicsModel` trait with the straight/flat reference model and an incline variant
//! - `Controller` trait with constant, full-throttle and speed-hold strategies
//! - Fixed-step semi-implicit Euler integrator producing a telemetry `History`

pub mod controller;
pub mod error;
pub mod incline;
pub mod integrator;
pub mod model;
pub mod state;
pub mod straight_flat;
pub mod telemetry;

// Re-exports for public API
pub use controller::{ConstantInputs, Controller, DriverInputs, FullThrottle, SpeedHold};
pub use error::{SimError, SimResult};
pub use incline::{InclineModel, InclineParams};
pub use integrator::{SimOptions, TIME_EPSILON, run, run_with_options};
pub use model::DynamicsModel;
pub use state::VehicleState;
pub use straight_flat::{StraightFlatModel, StraightFlatParams};
pub use telemetry::{Extras, History, TelemetryRow};
