//! Straight, flat-terrain reference model.
//!
//! - Power-limited drive force: `F = eta * P / max(v, v_floor)`
//! - Rolling resistance only: `F_rr = Crr * m * g`, constant on flat ground
//!
//! Brake commands are accepted and clamped but produce no force in this model.

use serde::{Deserialize, Serialize};
use sl_core::clamp_unit;
use sl_core::units::{Force, Velocity, mps, n};

use crate::model::{DynamicsModel, advance};
use crate::state::VehicleState;
use crate::telemetry::Extras;

/// Extra telemetry keys reported by the power-limited models.
pub mod keys {
    pub const POWER: &str = "power_W";
    pub const DRIVE_FORCE: &str = "F_drive_N";
    pub const ROLLING_FORCE: &str = "F_rr_N";
}

/// Vehicle and drivetrain parameters (SI).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StraightFlatParams {
    /// Vehicle mass (kg)
    pub mass_kg: f64,
    /// Rolling resistance coefficient (-)
    pub rolling_coeff: f64,
    /// Gravitational acceleration (m/s^2)
    pub gravity_mps2: f64,
    /// Drivetrain efficiency (-)
    pub efficiency: f64,
    /// Power at full throttle (W)
    pub max_power_w: f64,
    /// Speed below which drive force stops growing (m/s)
    pub speed_floor_mps: f64,
}

impl Default for StraightFlatParams {
    fn default() -> Self {
        Self {
            mass_kg: 136.1,
            rolling_coeff: 0.014,
            gravity_mps2: sl_core::units::constants::G_MPS2,
            efficiency: 0.85,
            max_power_w: 1200.0,
            speed_floor_mps: 0.5,
        }
    }
}

impl StraightFlatParams {
    /// Propulsive force for a clamped throttle at the given speed.
    #[inline]
    pub fn drive_force(&self, throttle: f64, speed: f64) -> f64 {
        self.efficiency * (throttle * self.max_power_w) / speed.max(self.speed_floor_mps)
    }

    #[inline]
    pub fn weight(&self) -> f64 {
        self.mass_kg * self.gravity_mps2
    }
}

#[derive(Debug, Clone)]
pub struct StraightFlatModel {
    params: StraightFlatParams,
    f_rr: f64,
}

impl StraightFlatModel {
    pub fn new(params: StraightFlatParams) -> Self {
        let f_rr = params.rolling_coeff * params.weight();
        Self { params, f_rr }
    }

    pub fn params(&self) -> &StraightFlatParams {
        &self.params
    }

    pub fn rolling_resistance(&self) -> Force {
        n(self.f_rr)
    }

    /// Speed at which full-power drive force equals rolling resistance.
    ///
    /// Explicit integration approaches this from below and never crosses it.
    pub fn terminal_speed(&self) -> Velocity {
        mps(self.params.efficiency * self.params.max_power_w / self.f_rr)
    }

    /// Largest drive force the model can produce (at or below the speed floor).
    pub fn drive_force_ceiling(&self) -> Force {
        n(self.params.drive_force(1.0, 0.0))
    }
}

impl Default for StraightFlatModel {
    fn default() -> Self {
        Self::new(StraightFlatParams::default())
    }
}

impl DynamicsModel for StraightFlatModel {
    fn step(&self, state: &mut VehicleState, throttle: f64, brake: f64, dt: f64) -> Extras {
        let u = clamp_unit(throttle);
        // kept for interface stability, no braking force on flat v1
        let _b = clamp_unit(brake);

        let power = u * self.params.max_power_w;
        let f_drive = self.params.drive_force(u, state.v);
        let f_net = f_drive - self.f_rr;

        advance(state, f_net / self.params.mass_kg, dt);

        [
            (keys::POWER, power),
            (keys::DRIVE_FORCE, f_drive),
            (keys::ROLLING_FORCE, self.f_rr),
        ]
        .into_iter()
        .collect()
    }

    fn name(&self) -> &str {
        "straight-flat"
    }
}
