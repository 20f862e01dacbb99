//! dg-hydraulics: physical model of the reservoir and its gate.
//!
//! Provides the hydraulic elements advanced once per tick:
//! - Inflow with rain contribution and bounded deterministic noise
//! - Sluice gate discharge via the submerged rectangular orifice integral
//! - Reservoir mass balance with level clamping
//! - Downstream channel level with exponential smoothing
//!
//! All elements are deterministic functions of their inputs and parameters.
//!
//! # Example
//!
//! ```
//! use dg_hydraulics::{DischargeElement, SluiceGate};
//! use dg_core::units::{as_m3ps, m, percent};
//!
//! let gate = SluiceGate::reference("main gate");
//! let q = gate.discharge(m(5.0), percent(50.0)).unwrap();
//! assert!(as_m3ps(q) > 0.0);
//! ```

pub mod common;
pub mod downstream;
pub mod error;
pub mod inflow;
pub mod reservoir;
pub mod sluice_gate;
pub mod traits;

// Re-exports
pub use downstream::DownstreamChannel;
pub use error::{HydraulicsError, HydraulicsResult};
pub use inflow::{InflowModel, Rainfall};
pub use reservoir::Reservoir;
pub use sluice_gate::SluiceGate;
pub use traits::DischargeElement;
