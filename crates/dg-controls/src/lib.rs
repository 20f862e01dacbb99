//! Gate control primitives for damgate.
//!
//! This crate holds everything that decides where the gate should go and how
//! it gets there:
//! - the level control law (order override, automatic setpoint tracking,
//!   manual hold)
//! - the rate-limited gate actuator and the derived gate status
//! - discrete manual jog steps
//! - alert classification of the water level
//!
//! # Architecture
//!
//! All quantities are plain `f64` in operator units: metres for levels,
//! percent of full travel for gate positions. Every function is pure; the
//! owner of the simulation state feeds previous values in and stores the
//! results.

pub mod actuator;
pub mod alert;
pub mod error;
pub mod jog;
pub mod law;
pub mod mode;

pub use actuator::{GateActuator, GateStatus, GateStep};
pub use alert::{AlertLevel, AlertThresholds};
pub use error::{ControlError, ControlResult};
pub use jog::{JogConfig, JogDirection, apply_jog};
pub use law::{ControlInput, LevelControlLaw};
pub use mode::ControlMode;
