//! Plant configuration file schema.
//!
//! Every section is optional and falls back to the reference plant.

use chrono::{DateTime, Utc};
use dg_controls::{AlertThresholds, JogConfig, LevelControlLaw};
use dg_sim::{
    DEFAULT_NOISE_SEED, InitialConditions, ModelParams, MotorParams, PlantParams, SimResult,
    Simulation, SimulationConfig, Tariffs,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantConfig {
    /// Schema version. A file without the field reads as 0 (unversioned).
    #[serde(default = "unversioned")]
    pub version: u32,
    pub name: String,
    pub simulation: SimulationConfig,
    pub plant: PlantParams,
    pub motor: MotorParams,
    pub tariffs: Tariffs,
    pub control: LevelControlLaw,
    pub alerts: AlertThresholds,
    pub jog: JogConfig,
    pub initial: InitialConditions,
    pub noise_seed: u64,
}

fn unversioned() -> u32 {
    0
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            version: crate::LATEST_VERSION,
            name: "Reference dam".to_string(),
            simulation: SimulationConfig::default(),
            plant: PlantParams::default(),
            motor: MotorParams::default(),
            tariffs: Tariffs::default(),
            control: LevelControlLaw::default(),
            alerts: AlertThresholds::default(),
            jog: JogConfig::default(),
            initial: InitialConditions::default(),
            noise_seed: DEFAULT_NOISE_SEED,
        }
    }
}

impl PlantConfig {
    /// Reference configuration at the latest schema version.
    pub fn reference() -> Self {
        Self::default()
    }

    pub fn model_params(&self) -> ModelParams {
        ModelParams {
            plant: self.plant.clone(),
            motor: self.motor.clone(),
            control: self.control.clone(),
            alerts: self.alerts.clone(),
            noise_seed: self.noise_seed,
        }
    }

    /// Build a fresh simulation session starting at `start`.
    pub fn build_simulation(&self, start: DateTime<Utc>) -> SimResult<Simulation> {
        Simulation::new(
            self.model_params(),
            self.simulation.clone(),
            self.tariffs.clone(),
            &self.initial,
            start,
        )
    }
}
