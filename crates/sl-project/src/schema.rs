//! Scenario schema definitions.

use serde::{Deserialize, Serialize};
use sl_sim::{InclineParams, SimOptions, StraightFlatParams};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub model: ModelDef,
    pub controller: ControllerDef,
    #[serde(default)]
    pub run: SimOptions,
    #[serde(default)]
    pub initial: InitialDef,
}

impl Scenario {
    /// Reference setup: default vehicle on the flat straight, full throttle.
    pub fn reference(name: impl Into<String>) -> Self {
        Self {
            version: crate::validate::LATEST_VERSION,
            name: name.into(),
            description: None,
            model: ModelDef::StraightFlat(StraightFlatParams::default()),
            controller: ControllerDef::FullThrottle,
            run: SimOptions::default(),
            initial: InitialDef::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ModelDef {
    StraightFlat(StraightFlatParams),
    Incline(InclineParams),
}

impl ModelDef {
    pub fn kind(&self) -> &'static str {
        match self {
            ModelDef::StraightFlat(_) => "straight-flat",
            ModelDef::Incline(_) => "incline",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ControllerDef {
    FullThrottle,
    Constant {
        throttle: f64,
        #[serde(default)]
        brake: f64,
    },
    SpeedHold {
        target_mps: f64,
        gain: f64,
    },
}

impl ControllerDef {
    pub fn kind(&self) -> &'static str {
        match self {
            ControllerDef::FullThrottle => "full-throttle",
            ControllerDef::Constant { .. } => "constant",
            ControllerDef::SpeedHold { .. } => "speed-hold",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct InitialDef {
    #[serde(default)]
    pub x_m: f64,
    #[serde(default)]
    pub v_mps: f64,
}
