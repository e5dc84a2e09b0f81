//! Kinematic state of the vehicle at one instant.

use serde::{Deserialize, Serialize};

/// Vehicle kinematics along the path.
///
/// Only a [`DynamicsModel`](crate::DynamicsModel) writes this, through the
/// exclusive borrow the integrator hands it once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// Elapsed time (s)
    pub t: f64,
    /// Position along the path (m)
    pub x: f64,
    /// Speed (m/s), never negative
    pub v: f64,
    /// Last computed acceleration (m/s^2), telemetry only
    pub a: f64,
}

impl VehicleState {
    /// All-zero state at t=0.
    pub fn at_rest() -> Self {
        Self::default()
    }

    /// State at t=0 with a given position and speed.
    pub fn rolling(x: f64, v: f64) -> Self {
        Self {
            x,
            v,
            ..Self::default()
        }
    }
}
