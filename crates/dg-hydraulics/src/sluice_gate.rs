//! Vertical-lift sluice gate discharging as a submerged rectangular orifice.

use crate::common::{EPSILON_DEPTH, check_finite, depth_pow_1_5};
use crate::error::{HydraulicsError, HydraulicsResult};
use crate::traits::DischargeElement;
use dg_core::units::constants::G_MPS2;
use dg_core::units::{Length, Ratio, VolumeRate, m, m3ps};

/// Discharge coefficient of the reference gate.
pub const REFERENCE_CD: f64 = 0.6;
/// Gate width of the reference gate (m).
pub const REFERENCE_WIDTH_M: f64 = 3.0;
/// Full travel of the reference gate (m).
pub const REFERENCE_MAX_HEIGHT_M: f64 = 2.0;

/// Rectangular sluice gate at the reservoir floor.
///
/// The opening lifts the gate edge from the sill by `opening * max_height`.
/// Discharge integrates the Torricelli velocity over the open aperture:
///
/// `Q = (2/3) * Cd * b * sqrt(2g) * (h2^1.5 - h1^1.5)`
///
/// with `h2` the depth to the sill and `h1 = max(0, h2 - gate_height)` the
/// depth to the gate edge.
#[derive(Debug, Clone)]
pub struct SluiceGate {
    name: String,
    /// Discharge coefficient (dimensionless)
    pub cd: f64,
    /// Gate width
    pub width: Length,
    /// Gate height at 100 % opening
    pub max_height: Length,
}

impl SluiceGate {
    /// Create a new sluice gate.
    pub fn new(
        name: impl Into<String>,
        cd: f64,
        width: Length,
        max_height: Length,
    ) -> HydraulicsResult<Self> {
        if !(cd.is_finite() && cd > 0.0) {
            return Err(HydraulicsError::InvalidArg {
                what: "cd must be positive",
            });
        }
        if !(width.value.is_finite() && width.value > 0.0) {
            return Err(HydraulicsError::InvalidArg {
                what: "gate width must be positive",
            });
        }
        if !(max_height.value.is_finite() && max_height.value > 0.0) {
            return Err(HydraulicsError::InvalidArg {
                what: "gate max height must be positive",
            });
        }
        Ok(Self {
            name: name.into(),
            cd,
            width,
            max_height,
        })
    }

    /// Gate with the reference dimensions (Cd 0.6, 3 m wide, 2 m travel).
    pub fn reference(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cd: REFERENCE_CD,
            width: m(REFERENCE_WIDTH_M),
            max_height: m(REFERENCE_MAX_HEIGHT_M),
        }
    }

    /// Height of the gate edge above the sill for a fractional opening.
    pub fn gate_height(&self, opening: Ratio) -> Length {
        m(self.max_height.value * opening.value.clamp(0.0, 1.0))
    }
}

impl DischargeElement for SluiceGate {
    fn name(&self) -> &str {
        &self.name
    }

    fn discharge(&self, head: Length, opening: Ratio) -> HydraulicsResult<VolumeRate> {
        check_finite(head.value, "upstream head")?;
        check_finite(opening.value, "gate opening")?;

        let h2 = head.value;
        let gate_height = self.gate_height(opening).value;

        // Dry sill or closed gate: no discharge, and no fractional powers near zero.
        if h2 <= EPSILON_DEPTH || gate_height <= EPSILON_DEPTH {
            return Ok(m3ps(0.0));
        }

        let h1 = (h2 - gate_height).max(0.0);
        let q = (2.0 / 3.0)
            * self.cd
            * self.width.value
            * (2.0 * G_MPS2).sqrt()
            * (depth_pow_1_5(h2) - depth_pow_1_5(h1));

        check_finite(q, "gate discharge")?;

        Ok(m3ps(q.max(0.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dg_core::units::{as_m3ps, percent};

    fn q(level: f64, opening_pct: f64) -> f64 {
        let gate = SluiceGate::reference("test");
        as_m3ps(gate.discharge(m(level), percent(opening_pct)).unwrap())
    }

    #[test]
    fn closed_gate_zero_flow() {
        for level in [0.0, 0.5, 5.0, 10.0] {
            assert_eq!(q(level, 0.0), 0.0);
        }
    }

    #[test]
    fn dry_reservoir_zero_flow() {
        assert_eq!(q(0.0, 100.0), 0.0);
        assert_eq!(q(0.01, 100.0), 0.0);
        assert!(q(0.02, 100.0) > 0.0);
    }

    #[test]
    fn tiny_opening_below_threshold_zero_flow() {
        // 0.5 % of 2 m = 0.01 m, at the threshold
        assert_eq!(q(5.0, 0.5), 0.0);
        assert!(q(5.0, 1.0) > 0.0);
    }

    #[test]
    fn matches_orifice_integral() {
        // h2 = 5, gate height 1 m => h1 = 4
        let expected =
            (2.0 / 3.0) * 0.6 * 3.0 * (2.0 * 9.81_f64).sqrt() * (5.0_f64.powf(1.5) - 8.0);
        assert!((q(5.0, 50.0) - expected).abs() < 1e-9);
    }

    #[test]
    fn gate_above_water_surface_uses_full_head() {
        // Gate height 2 m exceeds head 1.5 m, so h1 = 0
        let expected = (2.0 / 3.0) * 0.6 * 3.0 * (2.0 * 9.81_f64).sqrt() * 1.5_f64.powf(1.5);
        assert!((q(1.5, 100.0) - expected).abs() < 1e-9);
    }

    #[test]
    fn flow_increases_with_opening() {
        let mut last = 0.0;
        for pct in [10.0, 25.0, 50.0, 75.0, 100.0] {
            let now = q(8.0, pct);
            assert!(now > last, "flow must increase with opening");
            last = now;
        }
    }

    #[test]
    fn non_finite_head_rejected() {
        let gate = SluiceGate::reference("test");
        assert!(gate.discharge(m(f64::NAN), percent(50.0)).is_err());
    }

    #[test]
    fn invalid_parameters() {
        assert!(SluiceGate::new("g", 0.0, m(3.0), m(2.0)).is_err());
        assert!(SluiceGate::new("g", 0.6, m(-3.0), m(2.0)).is_err());
        assert!(SluiceGate::new("g", 0.6, m(3.0), m(0.0)).is_err());
        assert!(SluiceGate::new("g", 0.6, m(3.0), m(2.0)).is_ok());
    }
}
