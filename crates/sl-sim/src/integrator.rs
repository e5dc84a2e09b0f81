//! Fixed-step simulation loop.
//!
//! Each tick asks the controller for commands, lets the model advance the
//! state in place, and appends one telemetry row built from the post-step
//! state. Simulated time is the only termination criterion.

use serde::{Deserialize, Serialize};
use sl_core::ensure_finite;
use tracing::debug;

use crate::controller::Controller;
use crate::error::{SimError, SimResult};
use crate::model::DynamicsModel;
use crate::state::VehicleState;
use crate::telemetry::{History, TelemetryRow};

/// Fraction of `dt` by which the horizon is pulled in before comparing.
///
/// Accumulating `t += dt` drifts (ten additions of 0.1 give
/// 0.9999999999999999; a million additions of 0.001 fall short by ~2e-5 dt),
/// which would otherwise buy an extra step when the horizon is a multiple of
/// `dt`.
///
/// The slack works both ways: a horizon less than `TIME_EPSILON * dt` past a
/// step boundary counts as reached at that boundary, so the last row's `t` can
/// sit just below the horizon (`T = 1.00005, dt = 0.1` ends at `t = 1.0`).
pub const TIME_EPSILON: f64 = 1e-3;

/// Upper bound on the row buffer reserved up front.
const MAX_PREALLOC_ROWS: usize = 1 << 20;

/// Options for simulation runs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimOptions {
    /// Fixed time step (seconds)
    pub dt_s: f64,
    /// Final simulation time (seconds)
    pub t_end_s: f64,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            dt_s: 0.01,
            t_end_s: 60.0,
        }
    }
}

/// Run a simulation from `state` until simulated time reaches `horizon_s`.
///
/// The returned history starts with a snapshot of `state` (zero commands, no
/// extras) followed by one row per step. A horizon at or before the starting
/// time yields just the snapshot.
pub fn run<M, C>(
    model: &M,
    state: VehicleState,
    controller: &C,
    horizon_s: f64,
    dt_s: f64,
) -> SimResult<History>
where
    M: DynamicsModel + ?Sized,
    C: Controller + ?Sized,
{
    validate(&state, horizon_s, dt_s)?;

    let mut state = state;
    let stop_at = horizon_s - dt_s * TIME_EPSILON;

    let mut rows = Vec::with_capacity(expected_rows(state.t, horizon_s, dt_s));
    rows.push(TelemetryRow::initial(&state));

    debug!(
        model = model.name(),
        controller = controller.name(),
        horizon_s,
        dt_s,
        "starting run"
    );

    while state.t < stop_at {
        let inputs = controller.decide(&state);
        let extras = model.step(&mut state, inputs.throttle, inputs.brake, dt_s);
        rows.push(TelemetryRow::from_step(&state, inputs, extras));
    }

    debug!(
        rows = rows.len(),
        t_s = state.t,
        x_m = state.x,
        v_mps = state.v,
        "run complete"
    );

    Ok(History::from_rows(rows))
}

/// [`run`] with the step and horizon taken from [`SimOptions`].
pub fn run_with_options<M, C>(
    model: &M,
    state: VehicleState,
    controller: &C,
    opts: &SimOptions,
) -> SimResult<History>
where
    M: DynamicsModel + ?Sized,
    C: Controller + ?Sized,
{
    run(model, state, controller, opts.t_end_s, opts.dt_s)
}

fn validate(state: &VehicleState, horizon_s: f64, dt_s: f64) -> SimResult<()> {
    if dt_s.is_nan() || dt_s <= 0.0 {
        return Err(SimError::InvalidConfiguration {
            what: "dt must be positive",
        });
    }
    if dt_s.is_infinite() {
        return Err(SimError::InvalidConfiguration {
            what: "dt must be finite",
        });
    }
    if !horizon_s.is_finite() {
        return Err(SimError::InvalidConfiguration {
            what: "horizon must be finite",
        });
    }

    ensure_finite(state.t, "initial time")?;
    ensure_finite(state.x, "initial position")?;
    ensure_finite(state.v, "initial speed")?;
    ensure_finite(state.a, "initial acceleration")?;
    if state.v < 0.0 {
        return Err(SimError::InvalidConfiguration {
            what: "initial speed must be non-negative",
        });
    }

    Ok(())
}

fn expected_rows(t0: f64, horizon_s: f64, dt_s: f64) -> usize {
    let steps = ((horizon_s - t0) / dt_s).ceil();
    if steps.is_finite() && steps > 0.0 {
        (steps as usize).saturating_add(1).min(MAX_PREALLOC_ROWS)
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{ConstantInputs, DriverInputs, FullThrottle};
    use crate::straight_flat::StraightFlatModel;
    use crate::telemetry::Extras;

    /// Advances time only; reports how many times it was called through `a`.
    struct Clock;

    impl DynamicsModel for Clock {
        fn step(&self, state: &mut VehicleState, _: f64, _: f64, dt: f64) -> Extras {
            state.a += 1.0;
            state.t += dt;
            Extras::new()
        }
    }

    #[test]
    fn sim_options_defaults() {
        let opts = SimOptions::default();
        assert_eq!(opts.dt_s, 0.01);
        assert_eq!(opts.t_end_s, 60.0);
    }

    #[test]
    fn ten_tenths_make_eleven_rows() {
        let h = run(&Clock, VehicleState::at_rest(), &FullThrottle, 1.0, 0.1).unwrap();
        assert_eq!(h.len(), 11);
        assert_eq!(h.last().unwrap().a, 10.0);
    }

    #[test]
    fn exact_binary_step_count() {
        let h = run(&Clock, VehicleState::at_rest(), &FullThrottle, 1.0, 0.125).unwrap();
        assert_eq!(h.len(), 9);
        assert_eq!(h.last().unwrap().t, 1.0);
    }

    #[test]
    fn partial_last_step_overshoots_horizon() {
        let h = run(&Clock, VehicleState::at_rest(), &FullThrottle, 1.05, 0.1).unwrap();
        assert_eq!(h.len(), 12);
        assert!(h.last().unwrap().t >= 1.05);
    }

    #[test]
    fn horizon_within_slack_of_a_boundary_stops_there() {
        let h = run(&Clock, VehicleState::at_rest(), &FullThrottle, 1.00005, 0.1).unwrap();
        assert_eq!(h.len(), 11);
        let last = h.last().unwrap().t;
        assert!(last < 1.00005);
        assert!(1.00005 - last <= 0.1 * TIME_EPSILON);

        // Just past the slack buys one more step
        let h = run(&Clock, VehicleState::at_rest(), &FullThrottle, 1.0002, 0.1).unwrap();
        assert_eq!(h.len(), 12);
        assert!(h.last().unwrap().t >= 1.0002);
    }

    #[test]
    fn non_positive_horizon_yields_snapshot_only() {
        for horizon in [0.0, -3.0] {
            let h = run(&Clock, VehicleState::at_rest(), &FullThrottle, horizon, 0.1).unwrap();
            assert_eq!(h.len(), 1);
        }
    }

    #[test]
    fn invalid_step_is_rejected() {
        for dt in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            let err = run(&Clock, VehicleState::at_rest(), &FullThrottle, 1.0, dt).unwrap_err();
            assert!(matches!(err, SimError::InvalidConfiguration { .. }));
        }
    }

    #[test]
    fn invalid_horizon_and_state_are_rejected() {
        let err = run(&Clock, VehicleState::at_rest(), &FullThrottle, f64::NAN, 0.1).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfiguration { .. }));

        let backwards = VehicleState::rolling(0.0, -1.0);
        let err = run(&Clock, backwards, &FullThrottle, 1.0, 0.1).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfiguration { .. }));

        let broken = VehicleState::rolling(f64::NAN, 0.0);
        let err = run(&Clock, broken, &FullThrottle, 1.0, 0.1).unwrap_err();
        assert!(matches!(err, SimError::NonFinite { .. }));
    }

    #[test]
    fn initial_row_is_pre_step_snapshot() {
        let start = VehicleState::rolling(12.0, 3.0);
        let model = StraightFlatModel::default();
        let h = run(&model, start, &FullThrottle, 0.5, 0.1).unwrap();
        let first = h.first().unwrap();
        assert_eq!((first.t, first.x, first.v), (0.0, 12.0, 3.0));
        assert_eq!((first.throttle, first.brake), (0.0, 0.0));
        assert!(first.extras.is_empty());
        assert!(h.rows()[1..].iter().all(|r| r.extras.len() == 3));
    }

    #[test]
    fn rows_record_raw_commands() {
        let model = StraightFlatModel::default();
        let h = run(&model, VehicleState::at_rest(), &ConstantInputs::new(2.0, -1.0), 0.3, 0.1)
            .unwrap();
        let second = &h.rows()[1];
        assert_eq!(second.throttle, 2.0);
        assert_eq!(second.brake, -1.0);
        assert_eq!(second.get("power_W"), Some(1200.0));
    }

    #[test]
    fn controller_sees_state_before_each_step() {
        let model = StraightFlatModel::default();
        let cutoff = |s: &VehicleState| {
            if s.t < 0.25 {
                DriverInputs::full_throttle()
            } else {
                DriverInputs::coast()
            }
        };
        let h = run(&model, VehicleState::at_rest(), &cutoff, 0.5, 0.1).unwrap();
        let throttles: Vec<f64> = h.iter().map(|r| r.throttle).collect();
        assert_eq!(throttles, vec![0.0, 1.0, 1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn boxed_trait_objects_run() {
        let model: Box<dyn DynamicsModel> = Box::new(StraightFlatModel::default());
        let controller: Box<dyn Controller> = Box::new(FullThrottle);
        let opts = SimOptions {
            dt_s: 0.1,
            t_end_s: 1.0,
        };
        let h = run_with_options(&model, VehicleState::at_rest(), controller.as_ref(), &opts)
            .unwrap();
        assert_eq!(h.len(), 11);
    }
}
