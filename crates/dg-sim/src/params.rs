//! Plant, motor and tariff parameters.
//!
//! Plain serializable numbers in operator units. `DamModel::from_params`
//! turns them into typed hydraulic elements.

use dg_controls::{AlertThresholds, LevelControlLaw};
use dg_core::numeric::{ensure_finite, ensure_positive};
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Default seed of the inflow perturbation sequence.
pub const DEFAULT_NOISE_SEED: u64 = 42;

/// Physical constants of the reservoir, gate and channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantParams {
    pub reservoir_area_m2: f64,
    pub max_water_level_m: f64,
    pub gate_width_m: f64,
    pub max_gate_height_m: f64,
    pub discharge_coefficient: f64,
    /// Gate travel per tick (percentage points)
    pub gate_speed_pct_per_tick: f64,
    pub base_inflow_m3ps: f64,
    /// Inflow per unit of rainfall intensity (m³/s)
    pub rain_gain: f64,
    pub noise_amplitude_m3ps: f64,
    pub downstream_base_m: f64,
    /// Downstream level rise per m³/s of outflow (m)
    pub downstream_gain: f64,
    /// Fraction of the downstream gap closed per tick
    pub downstream_smoothing: f64,
}

impl Default for PlantParams {
    fn default() -> Self {
        use dg_hydraulics::{downstream, inflow, reservoir, sluice_gate};
        Self {
            reservoir_area_m2: reservoir::REFERENCE_AREA_M2,
            max_water_level_m: reservoir::REFERENCE_MAX_LEVEL_M,
            gate_width_m: sluice_gate::REFERENCE_WIDTH_M,
            max_gate_height_m: sluice_gate::REFERENCE_MAX_HEIGHT_M,
            discharge_coefficient: sluice_gate::REFERENCE_CD,
            gate_speed_pct_per_tick: dg_controls::actuator::REFERENCE_GATE_SPEED,
            base_inflow_m3ps: inflow::REFERENCE_BASE_INFLOW_M3PS,
            rain_gain: inflow::REFERENCE_RAIN_GAIN,
            noise_amplitude_m3ps: inflow::REFERENCE_NOISE_AMPLITUDE_M3PS,
            downstream_base_m: downstream::REFERENCE_BASE_LEVEL_M,
            downstream_gain: downstream::REFERENCE_LEVEL_GAIN,
            downstream_smoothing: downstream::REFERENCE_SMOOTHING,
        }
    }
}

/// Two-level gate motor power model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorParams {
    /// Draw while the gate is travelling (kW)
    pub active_kw: f64,
    /// Draw at rest (kW)
    pub standby_kw: f64,
}

impl Default for MotorParams {
    fn default() -> Self {
        Self {
            active_kw: 15.0,
            standby_kw: 0.5,
        }
    }
}

impl MotorParams {
    pub fn validate(&self) -> SimResult<()> {
        non_negative(self.active_kw, "motor active power")?;
        non_negative(self.standby_kw, "motor standby power")?;
        Ok(())
    }
}

/// Prices applied to energy and delivered water.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tariffs {
    /// Electricity price per kWh
    pub elec_rate_per_kwh: f64,
    /// Water price per m³ delivered
    pub water_cost_per_m3: f64,
}

impl Default for Tariffs {
    fn default() -> Self {
        Self {
            elec_rate_per_kwh: 0.15,
            water_cost_per_m3: 0.05,
        }
    }
}

impl Tariffs {
    pub fn validate(&self) -> SimResult<()> {
        non_negative(self.elec_rate_per_kwh, "electricity rate")?;
        non_negative(self.water_cost_per_m3, "water cost")?;
        Ok(())
    }
}

/// Everything the tick function needs besides the state itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    pub plant: PlantParams,
    pub motor: MotorParams,
    pub control: LevelControlLaw,
    pub alerts: AlertThresholds,
    pub noise_seed: u64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            plant: PlantParams::default(),
            motor: MotorParams::default(),
            control: LevelControlLaw::default(),
            alerts: AlertThresholds::default(),
            noise_seed: DEFAULT_NOISE_SEED,
        }
    }
}

impl ModelParams {
    /// Check the pieces that are not already checked by element constructors.
    pub fn validate(&self) -> SimResult<()> {
        self.motor.validate()?;
        ensure_positive(self.control.deadband_m, "control dead-band")?;
        non_negative(self.control.open_gain, "control open gain")?;
        non_negative(self.control.close_step, "control close step")?;
        ensure_finite(self.alerts.warning_m, "warning level")?;
        ensure_finite(self.alerts.critical_m, "critical level")?;
        if self.alerts.warning_m > self.alerts.critical_m {
            return Err(SimError::InvalidArg {
                what: "warning level must not exceed critical level",
            });
        }
        Ok(())
    }
}

fn non_negative(v: f64, what: &'static str) -> SimResult<f64> {
    let v = ensure_finite(v, what)?;
    if v < 0.0 {
        return Err(SimError::InvalidValue { what, value: v });
    }
    Ok(v)
}
