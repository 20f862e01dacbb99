//! Alert classification of the reservoir level.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Alert level exposed to presentation and reporting collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertLevel {
    Normal,
    Warning,
    Critical,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Normal => "NORMAL",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

/// Level thresholds (m).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    pub warning_m: f64,
    pub critical_m: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            warning_m: 8.0,
            critical_m: 9.5,
        }
    }
}

impl AlertThresholds {
    /// `Normal` below warning, `Warning` in `[warning, critical)`, `Critical` at
    /// or above critical.
    pub fn classify(&self, water_level: f64) -> AlertLevel {
        if water_level >= self.critical_m {
            AlertLevel::Critical
        } else if water_level >= self.warning_m {
            AlertLevel::Warning
        } else {
            AlertLevel::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_inclusive_from_below() {
        let t = AlertThresholds::default();
        assert_eq!(t.classify(0.0), AlertLevel::Normal);
        assert_eq!(t.classify(7.999), AlertLevel::Normal);
        assert_eq!(t.classify(8.0), AlertLevel::Warning);
        assert_eq!(t.classify(9.49), AlertLevel::Warning);
        assert_eq!(t.classify(9.5), AlertLevel::Critical);
        assert_eq!(t.classify(10.0), AlertLevel::Critical);
    }

    #[test]
    fn ordering_follows_severity() {
        assert!(AlertLevel::Normal < AlertLevel::Warning);
        assert!(AlertLevel::Warning < AlertLevel::Critical);
        assert_eq!(AlertLevel::Warning.to_string(), "WARNING");
    }
}
