use std::path::PathBuf;

use sl_project::load_yaml;
use sl_project::schema::{ControllerDef, ModelDef};

fn scenario_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../scenarios")
        .join(name)
}

#[test]
fn bundled_straight_flat_scenario_loads() {
    let scenario = load_yaml(&scenario_path("straight_flat.yaml")).expect("failed to load");
    assert_eq!(scenario.name, "straight flat full throttle");
    assert!(matches!(scenario.model, ModelDef::StraightFlat(_)));
    assert_eq!(scenario.controller, ControllerDef::FullThrottle);
    assert_eq!(scenario.run.t_end_s, 120.0);
}

#[test]
fn bundled_hill_scenario_loads() {
    let scenario = load_yaml(&scenario_path("hill_speed_hold.yaml")).expect("failed to load");
    match scenario.model {
        ModelDef::Incline(p) => {
            assert_eq!(p.grade, 0.02);
            assert_eq!(p.base.mass_kg, 136.1);
        }
        other => panic!("unexpected model {other:?}"),
    }
    assert_eq!(scenario.initial.v_mps, 5.0);
}
