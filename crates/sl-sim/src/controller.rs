//! Driver controllers.
//!
//! A controller is a pure function of the current state: it reads a shared
//! borrow and returns commands. Keeping integral terms or other memory is out
//! of contract; anything stateful belongs in a model or in post-processing.
//!
//! Provides:
//! - **FullThrottle**: constant full throttle, no brake
//! - **ConstantInputs**: fixed throttle/brake pair
//! - **SpeedHold**: proportional speed regulation
//!
//! Any `Fn(&VehicleState) -> DriverInputs` closure is also a controller.

use serde::{Deserialize, Serialize};
use sl_core::clamp_unit;

use crate::state::VehicleState;

/// Throttle and brake commands for one tick.
///
/// Values are nominally in [0, 1]. Out-of-range values are legal here; the
/// model clamps them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DriverInputs {
    pub throttle: f64,
    pub brake: f64,
}

impl DriverInputs {
    pub fn new(throttle: f64, brake: f64) -> Self {
        Self { throttle, brake }
    }

    pub fn full_throttle() -> Self {
        Self::new(1.0, 0.0)
    }

    pub fn coast() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Both commands clamped to [0, 1]; NaN becomes 0.
    pub fn clamped(self) -> Self {
        Self {
            throttle: clamp_unit(self.throttle),
            brake: clamp_unit(self.brake),
        }
    }
}

/// Trait for driver controllers.
pub trait Controller {
    fn decide(&self, state: &VehicleState) -> DriverInputs;

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}

impl<F> Controller for F
where
    F: Fn(&VehicleState) -> DriverInputs,
{
    fn decide(&self, state: &VehicleState) -> DriverInputs {
        self(state)
    }

    fn name(&self) -> &str {
        "closure"
    }
}

/// Wide open throttle for the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FullThrottle;

impl Controller for FullThrottle {
    fn decide(&self, _state: &VehicleState) -> DriverInputs {
        DriverInputs::full_throttle()
    }

    fn name(&self) -> &str {
        "full-throttle"
    }
}

/// Fixed commands, stored verbatim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstantInputs {
    pub throttle: f64,
    pub brake: f64,
}

impl ConstantInputs {
    pub fn new(throttle: f64, brake: f64) -> Self {
        Self { throttle, brake }
    }

    pub fn coast() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl Controller for ConstantInputs {
    fn decide(&self, _state: &VehicleState) -> DriverInputs {
        DriverInputs::new(self.throttle, self.brake)
    }

    fn name(&self) -> &str {
        "constant"
    }
}

/// Proportional speed regulator.
///
/// Throttle rises with the speed deficit and brake with the excess, each
/// saturated at 1. Only one of the two is ever non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedHold {
    /// Target speed (m/s)
    pub target_mps: f64,
    /// Command per m/s of speed error
    pub gain: f64,
}

impl SpeedHold {
    pub fn new(target_mps: f64, gain: f64) -> Self {
        Self { target_mps, gain }
    }
}

impl Controller for SpeedHold {
    fn decide(&self, state: &VehicleState) -> DriverInputs {
        let error = self.target_mps - state.v;
        DriverInputs {
            throttle: (self.gain * error).clamp(0.0, 1.0),
            brake: (-self.gain * error).clamp(0.0, 1.0),
        }
    }

    fn name(&self) -> &str {
        "speed-hold"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_throttle_ignores_state() {
        let c = FullThrottle;
        let fast = VehicleState::rolling(100.0, 80.0);
        assert_eq!(c.decide(&VehicleState::at_rest()), DriverInputs::new(1.0, 0.0));
        assert_eq!(c.decide(&fast), DriverInputs::new(1.0, 0.0));
    }

    #[test]
    fn constant_inputs_are_not_clamped() {
        let c = ConstantInputs::new(1.7, -0.2);
        let out = c.decide(&VehicleState::at_rest());
        assert_eq!(out, DriverInputs::new(1.7, -0.2));
        assert_eq!(out.clamped(), DriverInputs::new(1.0, 0.0));
    }

    #[test]
    fn speed_hold_throttles_below_and_brakes_above() {
        let c = SpeedHold::new(10.0, 0.5);

        let slow = c.decide(&VehicleState::rolling(0.0, 9.0));
        assert!((slow.throttle - 0.5).abs() < 1e-12);
        assert_eq!(slow.brake, 0.0);

        let fast = c.decide(&VehicleState::rolling(0.0, 12.0));
        assert_eq!(fast.throttle, 0.0);
        assert!((fast.brake - 1.0).abs() < 1e-12);

        let stopped = c.decide(&VehicleState::at_rest());
        assert_eq!(stopped.throttle, 1.0);
    }

    #[test]
    fn closures_are_controllers() {
        let c = |s: &VehicleState| {
            if s.t < 1.0 {
                DriverInputs::full_throttle()
            } else {
                DriverInputs::coast()
            }
        };
        assert_eq!(c.decide(&VehicleState::at_rest()).throttle, 1.0);
        let later = VehicleState {
            t: 2.0,
            ..VehicleState::default()
        };
        assert_eq!(c.decide(&later).throttle, 0.0);
        assert_eq!(Controller::name(&c), "closure");
    }
}
