//! Scenario definitions to runtime model, controller and start state.

use sl_project::schema::{ControllerDef, InitialDef, ModelDef};
use sl_sim::{
    ConstantInputs, Controller, DynamicsModel, FullThrottle, InclineModel, SpeedHold,
    StraightFlatModel, VehicleState,
};

pub fn build_model(def: &ModelDef) -> Box<dyn DynamicsModel> {
    match def {
        ModelDef::StraightFlat(params) => Box::new(StraightFlatModel::new(*params)),
        ModelDef::Incline(params) => Box::new(InclineModel::new(*params)),
    }
}

pub fn build_controller(def: &ControllerDef) -> Box<dyn Controller> {
    match def {
        ControllerDef::FullThrottle => Box::new(FullThrottle),
        ControllerDef::Constant { throttle, brake } => {
            Box::new(ConstantInputs::new(*throttle, *brake))
        }
        ControllerDef::SpeedHold { target_mps, gain } => {
            Box::new(SpeedHold::new(*target_mps, *gain))
        }
    }
}

pub fn initial_state(def: &InitialDef) -> VehicleState {
    VehicleState::rolling(def.x_m, def.v_mps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sl_sim::{InclineParams, StraightFlatParams};

    #[test]
    fn models_keep_their_names() {
        let flat = build_model(&ModelDef::StraightFlat(StraightFlatParams::default()));
        assert_eq!(flat.name(), "straight-flat");
        let hill = build_model(&ModelDef::Incline(InclineParams::default()));
        assert_eq!(hill.name(), "incline");
    }

    #[test]
    fn controllers_match_definitions() {
        let state = VehicleState::rolling(0.0, 10.0);

        let full = build_controller(&ControllerDef::FullThrottle);
        assert_eq!(full.decide(&state).throttle, 1.0);

        let constant = build_controller(&ControllerDef::Constant {
            throttle: 0.3,
            brake: 0.1,
        });
        let inputs = constant.decide(&state);
        assert_eq!((inputs.throttle, inputs.brake), (0.3, 0.1));

        let hold = build_controller(&ControllerDef::SpeedHold {
            target_mps: 12.0,
            gain: 0.25,
        });
        let inputs = hold.decide(&state);
        assert!((inputs.throttle - 0.5).abs() < 1e-12);
        assert_eq!(inputs.brake, 0.0);
    }

    #[test]
    fn initial_state_starts_at_zero_time() {
        let s = initial_state(&InitialDef {
            x_m: 5.0,
            v_mps: 2.0,
        });
        assert_eq!((s.t, s.x, s.v, s.a), (0.0, 5.0, 2.0, 0.0));
    }
}
