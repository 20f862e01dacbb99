//! Manual jog commands.
//!
//! A press moves the gate target one small step right away; holding the
//! button repeats a larger step on a fixed interval until release. Timing of
//! the repeat belongs to the scheduler; this module only defines the steps.

use crate::error::{ControlError, ControlResult};
use dg_core::numeric::{clamp_percent, ensure_positive};
use serde::{Deserialize, Serialize};

/// Jog direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JogDirection {
    Open,
    Close,
}

impl JogDirection {
    fn sign(self) -> f64 {
        match self {
            Self::Open => 1.0,
            Self::Close => -1.0,
        }
    }
}

/// Step sizes and repeat interval of the jog buttons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JogConfig {
    /// Step applied on press (percentage points)
    pub press_step: f64,
    /// Step applied on each repeat while held (percentage points)
    pub repeat_step: f64,
    /// Repeat interval while held (ms)
    pub repeat_interval_ms: u64,
}

impl Default for JogConfig {
    fn default() -> Self {
        Self {
            press_step: 1.0,
            repeat_step: 2.0,
            repeat_interval_ms: 100,
        }
    }
}

impl JogConfig {
    pub fn validate(&self) -> ControlResult<()> {
        ensure_positive(self.press_step, "jog press step")?;
        ensure_positive(self.repeat_step, "jog repeat step")?;
        if self.repeat_interval_ms == 0 {
            return Err(ControlError::InvalidArg {
                what: "jog repeat interval must be positive",
            });
        }
        Ok(())
    }
}

/// Move a gate target by `step` in `direction`, clamped to `[0, 100]`.
pub fn apply_jog(target: f64, direction: JogDirection, step: f64) -> f64 {
    clamp_percent(target + direction.sign() * step.abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_repeat_steps() {
        let cfg = JogConfig::default();
        let t = apply_jog(50.0, JogDirection::Open, cfg.press_step);
        assert_eq!(t, 51.0);
        let t = apply_jog(t, JogDirection::Open, cfg.repeat_step);
        assert_eq!(t, 53.0);
        let t = apply_jog(t, JogDirection::Close, cfg.repeat_step);
        assert_eq!(t, 51.0);
    }

    #[test]
    fn invalid_config() {
        assert!(JogConfig::default().validate().is_ok());
        let cfg = JogConfig {
            press_step: 0.0,
            ..JogConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ControlError::InvalidValue(_))));
        let cfg = JogConfig {
            repeat_interval_ms: 0,
            ..JogConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ControlError::InvalidArg { .. })));
    }

    #[test]
    fn jog_clamped_at_travel_limits() {
        assert_eq!(apply_jog(99.5, JogDirection::Open, 2.0), 100.0);
        assert_eq!(apply_jog(0.5, JogDirection::Close, 1.0), 0.0);
        assert_eq!(apply_jog(0.0, JogDirection::Close, 2.0), 0.0);
    }
}
