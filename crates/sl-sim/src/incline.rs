//! Constant-grade model with aerodynamic drag and friction brakes.
//!
//! Same power-limited drive law as the flat reference. Resistance adds:
//! - rolling `Crr * m * g * cos(theta)`
//! - grade `m * g * sin(theta)`, negative downhill
//! - drag `0.5 * rho * CdA * v^2`
//! - brake `b * F_brake_max`, which at rest only holds the vehicle

use serde::{Deserialize, Serialize};
use sl_core::clamp_unit;

use crate::model::{DynamicsModel, advance};
use crate::state::VehicleState;
use crate::straight_flat::{StraightFlatParams, keys as drive_keys};
use crate::telemetry::Extras;

pub mod keys {
    pub const GRADE_FORCE: &str = "F_grade_N";
    pub const DRAG_FORCE: &str = "F_drag_N";
    pub const BRAKE_FORCE: &str = "F_brake_N";
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InclineParams {
    #[serde(flatten)]
    pub base: StraightFlatParams,
    /// Rise over run (-), positive uphill
    pub grade: f64,
    /// Drag coefficient times frontal area (m^2)
    pub drag_area_m2: f64,
    /// Air density (kg/m^3)
    pub air_density_kgpm3: f64,
    /// Brake force at full brake command (N)
    pub max_brake_force_n: f64,
}

impl Default for InclineParams {
    fn default() -> Self {
        Self {
            base: StraightFlatParams::default(),
            grade: 0.0,
            drag_area_m2: 0.0,
            air_density_kgpm3: 1.225,
            max_brake_force_n: 1500.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InclineModel {
    params: InclineParams,
    f_rr: f64,
    f_grade: f64,
}

impl InclineModel {
    pub fn new(params: InclineParams) -> Self {
        let theta = params.grade.atan();
        let weight = params.base.weight();
        Self {
            params,
            f_rr: params.base.rolling_coeff * weight * theta.cos(),
            f_grade: weight * theta.sin(),
        }
    }

    pub fn params(&self) -> &InclineParams {
        &self.params
    }

    fn drag(&self, v: f64) -> f64 {
        0.5 * self.params.air_density_kgpm3 * self.params.drag_area_m2 * v * v
    }
}

impl DynamicsModel for InclineModel {
    fn step(&self, state: &mut VehicleState, throttle: f64, brake: f64, dt: f64) -> Extras {
        let u = clamp_unit(throttle);
        let b = clamp_unit(brake);
        let base = &self.params.base;

        let power = u * base.max_power_w;
        let f_drive = base.drive_force(u, state.v);
        let f_drag = self.drag(state.v);

        let brake_capacity = b * self.params.max_brake_force_n;
        let f_brake = if state.v > 0.0 {
            brake_capacity
        } else {
            // Static: the brake resists only what would start the vehicle rolling
            let push = f_drive - self.f_rr - self.f_grade;
            brake_capacity.min(push.max(0.0))
        };

        let f_net = f_drive - self.f_rr - self.f_grade - f_drag - f_brake;
        advance(state, f_net / base.mass_kg, dt);

        let mut extras = Extras::with_capacity(6);
        extras.insert(drive_keys::POWER, power);
        extras.insert(drive_keys::DRIVE_FORCE, f_drive);
        extras.insert(drive_keys::ROLLING_FORCE, self.f_rr);
        extras.insert(keys::GRADE_FORCE, self.f_grade);
        extras.insert(keys::DRAG_FORCE, f_drag);
        extras.insert(keys::BRAKE_FORCE, f_brake);
        extras
    }

    fn name(&self) -> &str {
        "incline"
    }
}
