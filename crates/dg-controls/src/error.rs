//! Error types for control operations.

use dg_core::error::CoreError;
use thiserror::Error;

/// Result type for control operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur in control operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Non-finite or out-of-range numeric input.
    #[error("Invalid value: {0}")]
    InvalidValue(#[from] CoreError),
}
