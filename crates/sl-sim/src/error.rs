//! Error types for simulation runs.

use thiserror::Error;

/// Errors raised before or during a simulation run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid configuration: {what}")]
    InvalidConfiguration { what: &'static str },

    #[error("Non-finite value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<sl_core::CoreError> for SimError {
    fn from(e: sl_core::CoreError) -> Self {
        match e {
            sl_core::CoreError::NonFinite { what, value } => SimError::NonFinite { what, value },
            sl_core::CoreError::InvalidArg { what } => SimError::InvalidConfiguration { what },
        }
    }
}
