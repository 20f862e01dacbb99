//! Reservoir mass balance.

use crate::common::check_finite;
use crate::error::{HydraulicsError, HydraulicsResult};
use dg_core::numeric::clamp_non_negative;
use dg_core::units::{Area, Length, Time, VolumeRate, m, m2};

/// Planform area of the reference reservoir (m²).
pub const REFERENCE_AREA_M2: f64 = 1000.0;
/// Crest level of the reference reservoir (m).
pub const REFERENCE_MAX_LEVEL_M: f64 = 10.0;

/// Prismatic reservoir: constant planform area up to the crest.
#[derive(Debug, Clone)]
pub struct Reservoir {
    /// Planform area
    pub area: Area,
    /// Maximum water level (crest)
    pub max_level: Length,
}

impl Reservoir {
    pub fn new(area: Area, max_level: Length) -> HydraulicsResult<Self> {
        if !(area.value.is_finite() && area.value > 0.0) {
            return Err(HydraulicsError::InvalidArg {
                what: "reservoir area must be positive",
            });
        }
        if !(max_level.value.is_finite() && max_level.value > 0.0) {
            return Err(HydraulicsError::InvalidArg {
                what: "max water level must be positive",
            });
        }
        Ok(Self { area, max_level })
    }

    pub fn reference() -> Self {
        Self {
            area: m2(REFERENCE_AREA_M2),
            max_level: m(REFERENCE_MAX_LEVEL_M),
        }
    }

    /// Clamp a level into `[0, max_level]`.
    pub fn clamp_level(&self, level: Length) -> Length {
        m(clamp_non_negative(level.value, self.max_level.value))
    }

    /// Advance the level over `dt`:
    /// `clamp(level + (inflow - outflow) / area * dt, 0, max_level)`.
    pub fn next_level(
        &self,
        level: Length,
        inflow: VolumeRate,
        outflow: VolumeRate,
        dt: Time,
    ) -> HydraulicsResult<Length> {
        check_finite(level.value, "water level")?;
        check_finite(inflow.value, "inflow")?;
        check_finite(outflow.value, "outflow")?;
        check_finite(dt.value, "tick duration")?;

        let dh = (inflow.value - outflow.value) / self.area.value * dt.value;
        check_finite(dh, "level change")?;

        Ok(self.clamp_level(m(level.value + dh)))
    }
}
