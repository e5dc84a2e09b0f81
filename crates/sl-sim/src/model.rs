//! DynamicsModel trait for pluggable force models.

use crate::state::VehicleState;
use crate::telemetry::Extras;

/// Trait for longitudinal force models.
///
/// A DynamicsModel must, in one call:
/// 1) Clamp throttle and brake to [0, 1] (never reject them)
/// 2) Compute propulsive and resisting forces
/// 3) Set `a = F_net / m` and advance the state with [`advance`]
/// 4) Return any auxiliary quantities worth logging (may be empty)
///
/// Parameters are fixed at construction, so `step` takes `&self`. The state is
/// the only thing written.
pub trait DynamicsModel {
    fn step(&self, state: &mut VehicleState, throttle: f64, brake: f64, dt: f64) -> Extras;

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}

impl<M: DynamicsModel + ?Sized> DynamicsModel for Box<M> {
    fn step(&self, state: &mut VehicleState, throttle: f64, brake: f64, dt: f64) -> Extras {
        (**self).step(state, throttle, brake, dt)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Semi-implicit Euler update shared by all models.
///
/// Speed is clamped at zero before position is integrated, and position uses
/// the updated speed.
#[inline]
pub fn advance(state: &mut VehicleState, accel: f64, dt: f64) {
    state.a = accel;
    state.v = (state.v + accel * dt).max(0.0);
    state.x += state.v * dt;
    state.t += dt;
}
