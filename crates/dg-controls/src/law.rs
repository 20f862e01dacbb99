//! Level control law.
//!
//! Decides the gate target for the next tick. Priority, first match wins:
//! 1. an active watering order forces the gate fully open;
//! 2. AUTO mode tracks the level setpoint;
//! 3. MANUAL mode keeps whatever target the jog commands last set.
//!
//! The AUTO law is deliberately asymmetric. A level above the setpoint opens
//! the gate proportionally to the error; a level below the setpoint closes it
//! by a fixed small step per tick. Inside the dead-band the gate holds.

use crate::mode::ControlMode;
use dg_core::numeric::{PERCENT_MAX, clamp_percent};
use serde::{Deserialize, Serialize};

/// Inputs of one control decision, taken from the previous state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlInput {
    pub mode: ControlMode,
    pub has_active_order: bool,
    /// Operator setpoint (m)
    pub target_level: f64,
    /// Previous water level (m)
    pub water_level: f64,
    /// Previous actual gate position (%)
    pub gate_opening: f64,
    /// Previous gate target (%)
    pub target_gate_opening: f64,
}

/// Gains and dead-band of the level control law.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelControlLaw {
    /// Half-width of the hold band around the setpoint (m).
    pub deadband_m: f64,
    /// Opening gain, percentage points per metre of excess level.
    pub open_gain: f64,
    /// Fixed closing step per tick (percentage points).
    pub close_step: f64,
}

impl Default for LevelControlLaw {
    fn default() -> Self {
        Self {
            deadband_m: 0.2,
            open_gain: 5.0,
            close_step: 2.0,
        }
    }
}

impl LevelControlLaw {
    /// Compute the gate target for the next tick, clamped to `[0, 100]`.
    pub fn next_target(&self, input: &ControlInput) -> f64 {
        if input.has_active_order {
            return PERCENT_MAX;
        }

        let target = match input.mode {
            ControlMode::Auto => {
                let error = input.water_level - input.target_level;
                if error > self.deadband_m {
                    (input.gate_opening + error * self.open_gain).min(PERCENT_MAX)
                } else if error < -self.deadband_m {
                    (input.gate_opening - self.close_step).max(0.0)
                } else {
                    input.gate_opening
                }
            }
            ControlMode::Manual => input.target_gate_opening,
        };

        clamp_percent(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(mode: ControlMode, level: f64, setpoint: f64, gate: f64) -> ControlInput {
        ControlInput {
            mode,
            has_active_order: false,
            target_level: setpoint,
            water_level: level,
            gate_opening: gate,
            target_gate_opening: gate,
        }
    }

    #[test]
    fn auto_high_level_opens_proportionally() {
        let law = LevelControlLaw::default();
        let t = law.next_target(&input(ControlMode::Auto, 6.0, 5.0, 30.0));
        assert!((t - 35.0).abs() < 1e-12);
    }

    #[test]
    fn auto_open_clamped_to_full() {
        let law = LevelControlLaw::default();
        let t = law.next_target(&input(ControlMode::Auto, 10.0, 0.0, 90.0));
        assert_eq!(t, 100.0);
    }

    #[test]
    fn auto_low_level_closes_by_fixed_step() {
        let law = LevelControlLaw::default();
        let t = law.next_target(&input(ControlMode::Auto, 4.5, 5.0, 30.0));
        assert_eq!(t, 28.0);
        // A much larger error closes by the same step
        let t = law.next_target(&input(ControlMode::Auto, 0.5, 5.0, 30.0));
        assert_eq!(t, 28.0);
    }

    #[test]
    fn auto_close_clamped_to_zero() {
        let law = LevelControlLaw::default();
        let t = law.next_target(&input(ControlMode::Auto, 4.5, 5.0, 1.0));
        assert_eq!(t, 0.0);
    }

    #[test]
    fn auto_deadband_holds_current_position() {
        let law = LevelControlLaw::default();
        for level in [4.85, 4.9, 5.0, 5.1, 5.15] {
            let mut i = input(ControlMode::Auto, level, 5.0, 42.0);
            i.target_gate_opening = 80.0;
            assert_eq!(law.next_target(&i), 42.0, "level {level}");
        }
    }

    #[test]
    fn manual_keeps_previous_target() {
        let law = LevelControlLaw::default();
        let mut i = input(ControlMode::Manual, 9.0, 5.0, 10.0);
        i.target_gate_opening = 63.0;
        assert_eq!(law.next_target(&i), 63.0);
    }

    #[test]
    fn active_order_overrides_both_modes() {
        let law = LevelControlLaw::default();
        for mode in [ControlMode::Auto, ControlMode::Manual] {
            let mut i = input(mode, 2.0, 5.0, 10.0);
            i.has_active_order = true;
            assert_eq!(law.next_target(&i), 100.0);
        }
    }
}
