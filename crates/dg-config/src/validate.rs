//! Configuration validation.
//!
//! Checks ranges and finiteness field by field so a bad file is reported by
//! its dotted path, before any simulation element is built from it.

use crate::schema::PlantConfig;
use dg_sim::{MAX_SIMULATION_SPEED_MS, MIN_SIMULATION_SPEED_MS};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(field: &str, v: f64) -> Result<(), ValidationError> {
    if !v.is_finite() {
        return Err(invalid(field, v, "must be finite"));
    }
    if v <= 0.0 {
        return Err(invalid(field, v, "must be positive"));
    }
    Ok(())
}

fn non_negative(field: &str, v: f64) -> Result<(), ValidationError> {
    if !v.is_finite() {
        return Err(invalid(field, v, "must be finite"));
    }
    if v < 0.0 {
        return Err(invalid(field, v, "must be non-negative"));
    }
    Ok(())
}

fn within(field: &str, v: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if !v.is_finite() {
        return Err(invalid(field, v, "must be finite"));
    }
    if v < min || v > max {
        return Err(invalid(field, v, &format!("must be in [{min}, {max}]")));
    }
    Ok(())
}

pub fn validate_config(config: &PlantConfig) -> Result<(), ValidationError> {
    if config.version > crate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: config.version,
        });
    }
    if config.name.trim().is_empty() {
        return Err(invalid("name", "\"\"", "must not be empty"));
    }

    let p = &config.plant;
    positive("plant.reservoir_area_m2", p.reservoir_area_m2)?;
    positive("plant.max_water_level_m", p.max_water_level_m)?;
    positive("plant.gate_width_m", p.gate_width_m)?;
    positive("plant.max_gate_height_m", p.max_gate_height_m)?;
    within("plant.discharge_coefficient", p.discharge_coefficient, 0.0, 1.0)?;
    if p.discharge_coefficient == 0.0 {
        return Err(invalid("plant.discharge_coefficient", 0.0, "must be positive"));
    }
    positive("plant.gate_speed_pct_per_tick", p.gate_speed_pct_per_tick)?;
    non_negative("plant.base_inflow_m3ps", p.base_inflow_m3ps)?;
    non_negative("plant.rain_gain", p.rain_gain)?;
    non_negative("plant.noise_amplitude_m3ps", p.noise_amplitude_m3ps)?;
    non_negative("plant.downstream_base_m", p.downstream_base_m)?;
    non_negative("plant.downstream_gain", p.downstream_gain)?;
    within("plant.downstream_smoothing", p.downstream_smoothing, 0.0, 1.0)?;
    if p.downstream_smoothing == 0.0 {
        return Err(invalid("plant.downstream_smoothing", 0.0, "must be positive"));
    }

    let sim = &config.simulation;
    within(
        "simulation.targetLevel",
        sim.target_level,
        0.0,
        p.max_water_level_m,
    )?;
    if !(MIN_SIMULATION_SPEED_MS..=MAX_SIMULATION_SPEED_MS).contains(&sim.simulation_speed_ms) {
        return Err(invalid(
            "simulation.simulationSpeed",
            sim.simulation_speed_ms,
            &format!("must be in [{MIN_SIMULATION_SPEED_MS}, {MAX_SIMULATION_SPEED_MS}] ms"),
        ));
    }

    non_negative("motor.active_kw", config.motor.active_kw)?;
    non_negative("motor.standby_kw", config.motor.standby_kw)?;
    non_negative("tariffs.elec_rate_per_kwh", config.tariffs.elec_rate_per_kwh)?;
    non_negative("tariffs.water_cost_per_m3", config.tariffs.water_cost_per_m3)?;

    positive("control.deadband_m", config.control.deadband_m)?;
    non_negative("control.open_gain", config.control.open_gain)?;
    non_negative("control.close_step", config.control.close_step)?;

    let alerts = &config.alerts;
    non_negative("alerts.warning_m", alerts.warning_m)?;
    non_negative("alerts.critical_m", alerts.critical_m)?;
    if alerts.warning_m > alerts.critical_m {
        return Err(invalid(
            "alerts.warning_m",
            alerts.warning_m,
            "must not exceed alerts.critical_m",
        ));
    }

    positive("jog.press_step", config.jog.press_step)?;
    positive("jog.repeat_step", config.jog.repeat_step)?;
    if config.jog.repeat_interval_ms == 0 {
        return Err(invalid("jog.repeat_interval_ms", 0, "must be positive"));
    }

    let init = &config.initial;
    within(
        "initial.water_level_m",
        init.water_level_m,
        0.0,
        p.max_water_level_m,
    )?;
    non_negative("initial.downstream_level_m", init.downstream_level_m)?;
    within("initial.gate_opening_pct", init.gate_opening_pct, 0.0, 100.0)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_config_is_valid() {
        assert_eq!(validate_config(&PlantConfig::reference()), Ok(()));
    }

    #[test]
    fn reports_field_of_bad_value() {
        let mut config = PlantConfig::reference();
        config.simulation.target_level = 12.0;
        match validate_config(&config) {
            Err(ValidationError::InvalidValue { field, value, .. }) => {
                assert_eq!(field, "simulation.targetLevel");
                assert_eq!(value, "12");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_non_finite_and_zero_values() {
        let mut config = PlantConfig::reference();
        config.tariffs.elec_rate_per_kwh = f64::NAN;
        assert!(validate_config(&config).is_err());

        let mut config = PlantConfig::reference();
        config.simulation.simulation_speed_ms = 0;
        assert!(validate_config(&config).is_err());

        let mut config = PlantConfig::reference();
        config.plant.discharge_coefficient = 0.0;
        assert!(validate_config(&config).is_err());

        let mut config = PlantConfig::reference();
        config.jog.repeat_interval_ms = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_future_version() {
        let config = PlantConfig {
            version: crate::LATEST_VERSION + 1,
            ..PlantConfig::reference()
        };
        assert_eq!(
            validate_config(&config),
            Err(ValidationError::UnsupportedVersion {
                version: crate::LATEST_VERSION + 1
            })
        );
    }
}
