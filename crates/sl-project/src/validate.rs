//! Scenario validation logic.

use crate::schema::{ControllerDef, InitialDef, ModelDef, Scenario};
use sl_sim::{InclineParams, SimOptions, StraightFlatParams};

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing field: {field}")]
    Missing { field: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    if scenario.version == 0 || scenario.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }
    if scenario.name.trim().is_empty() {
        return Err(ValidationError::Missing {
            field: "name".to_string(),
        });
    }

    match &scenario.model {
        ModelDef::StraightFlat(p) => validate_vehicle(p, "model")?,
        ModelDef::Incline(p) => validate_incline(p)?,
    }
    validate_controller(&scenario.controller)?;
    validate_run(&scenario.run)?;
    validate_initial(&scenario.initial)?;
    Ok(())
}

fn validate_vehicle(p: &StraightFlatParams, prefix: &str) -> Result<(), ValidationError> {
    positive(&format!("{prefix}.mass_kg"), p.mass_kg)?;
    non_negative(&format!("{prefix}.rolling_coeff"), p.rolling_coeff)?;
    non_negative(&format!("{prefix}.gravity_mps2"), p.gravity_mps2)?;
    positive(&format!("{prefix}.max_power_w"), p.max_power_w)?;
    positive(&format!("{prefix}.speed_floor_mps"), p.speed_floor_mps)?;

    finite(&format!("{prefix}.efficiency"), p.efficiency)?;
    if p.efficiency <= 0.0 || p.efficiency > 1.0 {
        return Err(invalid(
            &format!("{prefix}.efficiency"),
            p.efficiency,
            "must be in (0, 1]",
        ));
    }
    Ok(())
}

fn validate_incline(p: &InclineParams) -> Result<(), ValidationError> {
    validate_vehicle(&p.base, "model")?;
    finite("model.grade", p.grade)?;
    non_negative("model.drag_area_m2", p.drag_area_m2)?;
    non_negative("model.air_density_kgpm3", p.air_density_kgpm3)?;
    non_negative("model.max_brake_force_n", p.max_brake_force_n)?;
    Ok(())
}

fn validate_controller(c: &ControllerDef) -> Result<(), ValidationError> {
    match c {
        ControllerDef::FullThrottle => Ok(()),
        ControllerDef::Constant { throttle, brake } => {
            finite("controller.throttle", *throttle)?;
            finite("controller.brake", *brake)
        }
        ControllerDef::SpeedHold { target_mps, gain } => {
            non_negative("controller.target_mps", *target_mps)?;
            positive("controller.gain", *gain)
        }
    }
}

fn validate_run(run: &SimOptions) -> Result<(), ValidationError> {
    positive("run.dt_s", run.dt_s)?;
    non_negative("run.t_end_s", run.t_end_s)
}

fn validate_initial(initial: &InitialDef) -> Result<(), ValidationError> {
    finite("initial.x_m", initial.x_m)?;
    non_negative("initial.v_mps", initial.v_mps)
}

fn invalid(field: &str, value: f64, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, value, "must be finite"))
    }
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be positive"))
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), ValidationError> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be non-negative"))
    }
}
