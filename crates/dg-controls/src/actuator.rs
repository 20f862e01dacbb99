//! Gate actuator kinematics.
//!
//! The gate motor drives at a fixed speed expressed per tick, not per second:
//! each tick the position moves `speed` percentage points toward the target,
//! or lands exactly on it when closer than one step.

use crate::error::{ControlError, ControlResult};
use dg_core::numeric::{PERCENT_MAX, PERCENT_MIN, clamp_percent};
use serde::{Deserialize, Serialize};

/// Reference gate travel per tick (percentage points).
pub const REFERENCE_GATE_SPEED: f64 = 2.0;

/// Observable gate condition, derived from consecutive positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GateStatus {
    Open,
    Closed,
    Opening,
    Closing,
    PartiallyOpen,
}

impl GateStatus {
    /// Status from the previous and new positions.
    ///
    /// Motion wins over position: a gate that moved is OPENING or CLOSING even
    /// if it just reached an end stop.
    pub fn derive(previous: f64, current: f64) -> Self {
        if current > previous {
            Self::Opening
        } else if current < previous {
            Self::Closing
        } else if current == PERCENT_MIN {
            Self::Closed
        } else if current == PERCENT_MAX {
            Self::Open
        } else {
            Self::PartiallyOpen
        }
    }

    pub fn is_moving(self) -> bool {
        matches!(self, Self::Opening | Self::Closing)
    }
}

/// Result of one actuator step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateStep {
    /// New position (%)
    pub position: f64,
    pub status: GateStatus,
    /// Whether the motor drove this tick
    pub is_moving: bool,
}

/// Rate-limited gate actuator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GateActuator {
    /// Travel per tick (percentage points), must be positive
    pub speed: f64,
}

impl Default for GateActuator {
    fn default() -> Self {
        Self {
            speed: REFERENCE_GATE_SPEED,
        }
    }
}

impl GateActuator {
    /// Create a new gate actuator.
    ///
    /// # Errors
    ///
    /// Returns error if `speed` is not positive.
    pub fn new(speed: f64) -> ControlResult<Self> {
        if !(speed.is_finite() && speed > 0.0) {
            return Err(ControlError::InvalidArg {
                what: "gate speed must be positive",
            });
        }
        Ok(Self { speed })
    }

    /// Advance the gate one tick toward `target`.
    ///
    /// Both inputs are clamped to `[0, 100]` first.
    pub fn step(&self, position: f64, target: f64) -> GateStep {
        let position = clamp_percent(position);
        let target = clamp_percent(target);
        let diff = target - position;

        let new_position = if diff.abs() <= self.speed {
            target
        } else {
            clamp_percent(position + self.speed * diff.signum())
        };

        let status = GateStatus::derive(position, new_position);
        GateStep {
            position: new_position,
            status,
            is_moving: status.is_moving(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_at_fixed_rate() {
        let act = GateActuator::default();
        let s = act.step(40.0, 90.0);
        assert_eq!(s.position, 42.0);
        assert_eq!(s.status, GateStatus::Opening);
        assert!(s.is_moving);

        let s = act.step(40.0, 10.0);
        assert_eq!(s.position, 38.0);
        assert_eq!(s.status, GateStatus::Closing);
    }

    #[test]
    fn snaps_when_within_one_step() {
        let act = GateActuator::default();
        let s = act.step(40.0, 41.5);
        assert_eq!(s.position, 41.5);
        assert_eq!(s.status, GateStatus::Opening);
    }

    #[test]
    fn reaches_target_without_overshoot() {
        let act = GateActuator::default();
        let mut pos = 0.0;
        let mut ticks = 0;
        while pos != 37.0 {
            let next = act.step(pos, 37.0).position;
            assert!(next <= 37.0);
            assert!(next - pos <= 2.0);
            pos = next;
            ticks += 1;
            assert!(ticks < 100);
        }
        assert_eq!(ticks, 19);
        // Holds afterwards
        let s = act.step(pos, 37.0);
        assert_eq!(s.position, 37.0);
        assert_eq!(s.status, GateStatus::PartiallyOpen);
        assert!(!s.is_moving);
    }

    #[test]
    fn status_at_rest() {
        assert_eq!(GateStatus::derive(0.0, 0.0), GateStatus::Closed);
        assert_eq!(GateStatus::derive(100.0, 100.0), GateStatus::Open);
        assert_eq!(GateStatus::derive(55.0, 55.0), GateStatus::PartiallyOpen);
    }

    #[test]
    fn motion_wins_over_end_stop() {
        assert_eq!(GateStatus::derive(98.0, 100.0), GateStatus::Opening);
        assert_eq!(GateStatus::derive(1.0, 0.0), GateStatus::Closing);
    }

    #[test]
    fn out_of_range_inputs_are_clamped() {
        let act = GateActuator::default();
        let s = act.step(150.0, 150.0);
        assert_eq!(s.position, 100.0);
        let s = act.step(-5.0, -20.0);
        assert_eq!(s.position, 0.0);
    }

    #[test]
    fn invalid_speed() {
        assert!(GateActuator::new(0.0).is_err());
        assert!(GateActuator::new(-1.0).is_err());
        assert!(GateActuator::new(f64::NAN).is_err());
    }
}
