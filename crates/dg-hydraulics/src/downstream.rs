//! Downstream channel level, smoothed toward a rating-curve target.

use crate::common::check_finite;
use crate::error::{HydraulicsError, HydraulicsResult};
use dg_core::units::{Length, VolumeRate, m};

pub const REFERENCE_BASE_LEVEL_M: f64 = 0.5;
pub const REFERENCE_LEVEL_GAIN: f64 = 0.04;
pub const REFERENCE_SMOOTHING: f64 = 0.1;

/// Channel below the gate.
///
/// Target level is linear in outflow, `base + gain * Q`. The level moves a
/// fixed fraction of the remaining gap each tick.
#[derive(Debug, Clone)]
pub struct DownstreamChannel {
    /// Level with no discharge
    pub base_level: Length,
    /// Level rise per m³/s of discharge (m per m³/s)
    pub level_gain: f64,
    /// Fraction of the gap closed per tick, in `(0, 1]`
    pub smoothing: f64,
}

impl DownstreamChannel {
    pub fn new(base_level: Length, level_gain: f64, smoothing: f64) -> HydraulicsResult<Self> {
        if !(base_level.value.is_finite() && base_level.value >= 0.0) {
            return Err(HydraulicsError::InvalidArg {
                what: "downstream base level must be non-negative",
            });
        }
        if !(level_gain.is_finite() && level_gain >= 0.0) {
            return Err(HydraulicsError::InvalidArg {
                what: "downstream level gain must be non-negative",
            });
        }
        if !(smoothing.is_finite() && smoothing > 0.0 && smoothing <= 1.0) {
            return Err(HydraulicsError::InvalidArg {
                what: "downstream smoothing must be in (0, 1]",
            });
        }
        Ok(Self {
            base_level,
            level_gain,
            smoothing,
        })
    }

    pub fn reference() -> Self {
        Self {
            base_level: m(REFERENCE_BASE_LEVEL_M),
            level_gain: REFERENCE_LEVEL_GAIN,
            smoothing: REFERENCE_SMOOTHING,
        }
    }

    /// Equilibrium level for a discharge.
    pub fn target_level(&self, outflow: VolumeRate) -> Length {
        m(self.base_level.value + outflow.value * self.level_gain)
    }

    /// One smoothing step toward the target.
    pub fn next_level(&self, level: Length, outflow: VolumeRate) -> HydraulicsResult<Length> {
        check_finite(level.value, "downstream level")?;
        check_finite(outflow.value, "outflow")?;
        let target = self.target_level(outflow).value;
        let next = level.value + (target - level.value) * self.smoothing;
        Ok(m(next.max(0.0)))
    }
}
