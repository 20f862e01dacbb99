//! Common utilities for hydraulic calculations.

use crate::error::{HydraulicsError, HydraulicsResult};
use dg_core::numeric::ensure_finite;

/// Depth (m) at or below which a head or gate opening counts as dry/closed.
pub const EPSILON_DEPTH: f64 = 0.01;

/// Ensure a value is finite, returning HydraulicsError if not.
pub fn check_finite(value: f64, what: &'static str) -> HydraulicsResult<()> {
    ensure_finite(value, what).map_err(|_| HydraulicsError::NonPhysical { what })?;
    Ok(())
}

/// `x^1.5` for non-negative depths. Negative input is treated as zero depth.
pub fn depth_pow_1_5(depth: f64) -> f64 {
    if depth <= 0.0 {
        0.0
    } else {
        depth * depth.sqrt()
    }
}
