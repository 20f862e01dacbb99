//! Error types for hydraulic element operations.

use dg_core::error::CoreError;
use thiserror::Error;

/// Errors that can occur during hydraulic calculations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HydraulicsError {
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type HydraulicsResult<T> = Result<T, HydraulicsError>;

impl From<CoreError> for HydraulicsError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::NonFinite { what, .. } => HydraulicsError::NonPhysical { what },
            CoreError::OutOfRange { what, .. } => HydraulicsError::InvalidArg { what },
            CoreError::InvalidArg { what } => HydraulicsError::InvalidArg { what },
        }
    }
}
