//! Float helpers shared by the models and controllers.

use crate::CoreError;

/// Absolute and relative slack for comparing simulated quantities.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    pub abs: f64,
    pub rel: f64,
}

impl Tolerances {
    /// Whether `a` and `b` agree within either bound.
    pub fn accepts(&self, a: f64, b: f64) -> bool {
        let diff = (a - b).abs();
        diff <= self.abs || diff <= self.rel * a.abs().max(b.abs())
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: f64, b: f64, tol: Tolerances) -> bool {
    tol.accepts(a, b)
}

/// Pass `value` through, or name the quantity that went non-finite.
pub fn ensure_finite(value: f64, what: &'static str) -> Result<f64, CoreError> {
    match value.is_finite() {
        true => Ok(value),
        false => Err(CoreError::NonFinite { what, value }),
    }
}

/// Clamp a normalized command into [0, 1].
///
/// NaN maps to 0 so a bad command never produces drive force.
#[inline]
pub fn clamp_unit(command: f64) -> f64 {
    if command.is_nan() {
        0.0
    } else {
        command.clamp(0.0, 1.0)
    }
}
