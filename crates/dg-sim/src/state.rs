//! Snapshot types exchanged with presentation collaborators.

use chrono::{DateTime, TimeDelta, Utc};
use dg_controls::GateStatus;
use dg_core::numeric::{clamp_non_negative, clamp_percent, ensure_in_range};
use dg_core::units::{Time, ms};
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Shortest accepted tick period (ms).
pub const MIN_SIMULATION_SPEED_MS: u64 = 10;
/// Longest accepted tick period (ms).
pub const MAX_SIMULATION_SPEED_MS: u64 = 60_000;

/// Operator configuration of the running simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
    /// Level setpoint for automatic control (m)
    pub target_level: f64,
    /// Tick period; also the physics timestep (ms)
    #[serde(rename = "simulationSpeed")]
    pub simulation_speed_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            target_level: 5.0,
            simulation_speed_ms: 1000,
        }
    }
}

impl SimulationConfig {
    /// Physics timestep of one tick.
    pub fn dt(&self) -> Time {
        ms(self.simulation_speed_ms as f64)
    }

    pub fn validate(&self, max_water_level_m: f64) -> SimResult<()> {
        validate_target_level(self.target_level, max_water_level_m)?;
        validate_simulation_speed(self.simulation_speed_ms)?;
        Ok(())
    }
}

pub fn validate_target_level(level: f64, max_water_level_m: f64) -> SimResult<f64> {
    Ok(ensure_in_range(level, 0.0, max_water_level_m, "target level")?)
}

pub fn validate_simulation_speed(speed_ms: u64) -> SimResult<u64> {
    if !(MIN_SIMULATION_SPEED_MS..=MAX_SIMULATION_SPEED_MS).contains(&speed_ms) {
        return Err(SimError::InvalidValue {
            what: "simulation speed (ms)",
            value: speed_ms as f64,
        });
    }
    Ok(speed_ms)
}

/// Starting point of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialConditions {
    pub water_level_m: f64,
    pub downstream_level_m: f64,
    pub gate_opening_pct: f64,
}

impl Default for InitialConditions {
    fn default() -> Self {
        Self {
            water_level_m: 5.0,
            downstream_level_m: 0.5,
            gate_opening_pct: 0.0,
        }
    }
}

/// Immutable per-tick snapshot of the plant.
///
/// Replaced wholesale every tick. Carries everything the next tick reads, so
/// a restored snapshot resumes the exact same trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemState {
    /// Ticks elapsed since the session started
    pub tick: u64,
    /// Simulated seconds since the session started
    pub elapsed_s: f64,
    /// Simulated wall time of this snapshot
    pub timestamp: DateTime<Utc>,
    pub water_level: f64,
    pub downstream_level: f64,
    pub inflow_rate: f64,
    pub outflow_rate: f64,
    pub gate_opening: f64,
    pub target_gate_opening: f64,
    pub gate_status: GateStatus,
    pub is_raining: bool,
    pub rainfall_intensity: f64,
    /// Motor draw (kW)
    pub current_power: f64,
    /// Cumulative motor energy (kWh)
    pub total_energy: f64,
    /// Cumulative energy cost at the current rate
    pub total_cost: f64,
}

impl SystemState {
    /// State at session start. Bounded quantities are clamped.
    pub fn initial(init: &InitialConditions, max_water_level_m: f64, start: DateTime<Utc>) -> Self {
        let gate = clamp_percent(init.gate_opening_pct);
        Self {
            tick: 0,
            elapsed_s: 0.0,
            timestamp: start,
            water_level: clamp_non_negative(init.water_level_m, max_water_level_m),
            downstream_level: init.downstream_level_m.max(0.0),
            inflow_rate: 0.0,
            outflow_rate: 0.0,
            gate_opening: gate,
            target_gate_opening: gate,
            gate_status: GateStatus::derive(gate, gate),
            is_raining: false,
            rainfall_intensity: 0.0,
            current_power: 0.0,
            total_energy: 0.0,
            total_cost: 0.0,
        }
    }

    /// Timestamp one tick of `speed_ms` later.
    pub(crate) fn next_timestamp(&self, speed_ms: u64) -> DateTime<Utc> {
        self.timestamp + TimeDelta::milliseconds(speed_ms as i64)
    }
}
