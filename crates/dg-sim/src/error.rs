//! Error types for simulation operations.

use thiserror::Error;
use uuid::Uuid;

/// Errors encountered while advancing or commanding the simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invalid value for {what}: {value}")]
    InvalidValue { what: &'static str, value: f64 },

    #[error("Non-physical condition: {what}")]
    NonPhysical { what: &'static str },

    #[error("A watering order is already active: {id}")]
    OrderAlreadyActive { id: Uuid },

    #[error("No active watering order")]
    NoActiveOrder,

    #[error("Backend error: {message}")]
    Backend { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<dg_hydraulics::HydraulicsError> for SimError {
    fn from(e: dg_hydraulics::HydraulicsError) -> Self {
        match e {
            dg_hydraulics::HydraulicsError::NonPhysical { what } => SimError::NonPhysical { what },
            dg_hydraulics::HydraulicsError::InvalidArg { what } => SimError::InvalidArg { what },
        }
    }
}

impl From<dg_controls::ControlError> for SimError {
    fn from(e: dg_controls::ControlError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

impl From<dg_core::CoreError> for SimError {
    fn from(e: dg_core::CoreError) -> Self {
        match e {
            dg_core::CoreError::NonFinite { what, value } => SimError::InvalidValue { what, value },
            dg_core::CoreError::OutOfRange { what, value, .. } => {
                SimError::InvalidValue { what, value }
            }
            dg_core::CoreError::InvalidArg { what } => SimError::InvalidArg { what },
        }
    }
}
