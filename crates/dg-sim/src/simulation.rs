//! The simulation owner.
//!
//! `Simulation` exclusively owns the current state, the mode, the operator
//! configuration and the order book. Every mutation goes through a method on
//! it; callers never hold references into the state across ticks.

use chrono::{DateTime, Utc};
use dg_controls::{AlertLevel, ControlMode, JogDirection, apply_jog};
use dg_core::numeric::ensure_finite;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{SimError, SimResult};
use crate::model::{DamModel, TickContext};
use crate::order::{OrderBook, WateringOrder};
use crate::params::{ModelParams, Tariffs};
use crate::state::{
    InitialConditions, SimulationConfig, SystemState, validate_simulation_speed,
    validate_target_level,
};

/// Alert transition observed across one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertChange {
    pub from: AlertLevel,
    pub to: AlertLevel,
}

/// What one tick produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSummary {
    pub state: SystemState,
    pub alert: AlertLevel,
    pub alert_change: Option<AlertChange>,
    /// Order that reached its target volume on this tick
    pub completed: Option<WateringOrder>,
}

/// Everything needed to resume a session exactly where it left off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSnapshot {
    pub params: ModelParams,
    pub config: SimulationConfig,
    pub tariffs: Tariffs,
    pub mode: ControlMode,
    pub state: SystemState,
    pub orders: OrderBook,
}

#[derive(Debug, Clone)]
pub struct Simulation {
    model: DamModel,
    params: ModelParams,
    config: SimulationConfig,
    tariffs: Tariffs,
    mode: ControlMode,
    state: SystemState,
    orders: OrderBook,
}

impl Simulation {
    pub fn new(
        params: ModelParams,
        config: SimulationConfig,
        tariffs: Tariffs,
        initial: &InitialConditions,
        start: DateTime<Utc>,
    ) -> SimResult<Self> {
        let model = DamModel::from_params(&params)?;
        config.validate(model.max_water_level_m())?;
        tariffs.validate()?;
        let state = SystemState::initial(initial, model.max_water_level_m(), start);
        Ok(Self {
            model,
            params,
            config,
            tariffs,
            mode: ControlMode::default(),
            state,
            orders: OrderBook::default(),
        })
    }

    /// Reference plant starting now.
    pub fn with_defaults() -> SimResult<Self> {
        Self::new(
            ModelParams::default(),
            SimulationConfig::default(),
            Tariffs::default(),
            &InitialConditions::default(),
            Utc::now(),
        )
    }

    pub fn from_snapshot(snapshot: SimulationSnapshot) -> SimResult<Self> {
        let model = DamModel::from_params(&snapshot.params)?;
        snapshot.config.validate(model.max_water_level_m())?;
        snapshot.tariffs.validate()?;
        Ok(Self {
            model,
            params: snapshot.params,
            config: snapshot.config,
            tariffs: snapshot.tariffs,
            mode: snapshot.mode,
            state: snapshot.state,
            orders: snapshot.orders,
        })
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            params: self.params.clone(),
            config: self.config.clone(),
            tariffs: self.tariffs.clone(),
            mode: self.mode,
            state: self.state.clone(),
            orders: self.orders.clone(),
        }
    }

    pub fn state(&self) -> &SystemState {
        &self.state
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn tariffs(&self) -> &Tariffs {
        &self.tariffs
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    pub fn active_order(&self) -> Option<&WateringOrder> {
        self.orders.active()
    }

    pub fn last_completed(&self) -> Option<&WateringOrder> {
        self.orders.last_completed()
    }

    pub fn alert_level(&self) -> AlertLevel {
        self.params.alerts.classify(self.state.water_level)
    }

    /// Advance one tick, then run the completion check so a fulfilled order
    /// is closed before the next tick starts.
    pub fn tick(&mut self) -> SimResult<TickSummary> {
        let before = self.alert_level();

        let outcome = {
            let ctx = TickContext {
                mode: self.mode,
                config: &self.config,
                tariffs: &self.tariffs,
                active_order: self.orders.active(),
            };
            self.model.step(&self.state, &ctx)?
        };

        self.state = outcome.state;
        if let Some(order) = outcome.order {
            self.orders.update_active(order);
        }
        let completed = self.check_order_completion();

        let alert = self.alert_level();
        let alert_change = (alert != before).then_some(AlertChange {
            from: before,
            to: alert,
        });
        if let Some(change) = alert_change {
            if change.to > change.from {
                warn!(
                    from = %change.from,
                    to = %change.to,
                    level = self.state.water_level,
                    "alert level raised"
                );
            } else {
                info!(
                    from = %change.from,
                    to = %change.to,
                    level = self.state.water_level,
                    "alert level lowered"
                );
            }
        }

        Ok(TickSummary {
            state: self.state.clone(),
            alert,
            alert_change,
            completed,
        })
    }

    /// Promote the active order to COMPLETED if its target volume is reached.
    pub fn check_order_completion(&mut self) -> Option<WateringOrder> {
        let completed = self.orders.complete_if_fulfilled(self.state.timestamp)?;
        info!(
            id = %completed.id,
            client = %completed.client_name,
            delivered_m3 = completed.delivered_volume,
            energy_kwh = completed.power_consumed,
            "watering order completed"
        );
        Some(completed)
    }

    pub fn set_mode(&mut self, mode: ControlMode) {
        if mode != self.mode {
            info!(from = %self.mode, to = %mode, "control mode switched");
            self.mode = mode;
        }
    }

    /// Move the gate target by one jog step. Only effective in MANUAL mode;
    /// returns whether the target changed.
    pub fn jog(&mut self, direction: JogDirection, step: f64) -> bool {
        if self.mode != ControlMode::Manual {
            debug!(?direction, "jog ignored outside manual mode");
            return false;
        }
        if !step.is_finite() {
            return false;
        }
        let target = apply_jog(self.state.target_gate_opening, direction, step);
        if target == self.state.target_gate_opening {
            return false;
        }
        self.state = SystemState {
            target_gate_opening: target,
            ..self.state.clone()
        };
        debug!(?direction, target, "gate target jogged");
        true
    }

    pub fn set_target_level(&mut self, level: f64) -> SimResult<()> {
        let level = validate_target_level(level, self.model.max_water_level_m())?;
        debug!(level, "target level set");
        self.config.target_level = level;
        Ok(())
    }

    pub fn set_simulation_speed(&mut self, speed_ms: u64) -> SimResult<()> {
        let speed_ms = validate_simulation_speed(speed_ms)?;
        debug!(speed_ms, "simulation speed set");
        self.config.simulation_speed_ms = speed_ms;
        Ok(())
    }

    pub fn set_rain(&mut self, is_raining: bool, intensity: f64) -> SimResult<()> {
        let intensity = ensure_finite(intensity, "rainfall intensity")?;
        if intensity < 0.0 {
            return Err(SimError::InvalidValue {
                what: "rainfall intensity",
                value: intensity,
            });
        }
        self.state = SystemState {
            is_raining,
            rainfall_intensity: intensity,
            ..self.state.clone()
        };
        Ok(())
    }

    /// Change the electricity rate. Cost is repriced immediately.
    pub fn set_elec_rate(&mut self, rate_per_kwh: f64) -> SimResult<()> {
        let tariffs = Tariffs {
            elec_rate_per_kwh: rate_per_kwh,
            ..self.tariffs.clone()
        };
        tariffs.validate()?;
        self.tariffs = tariffs;
        self.state = SystemState {
            total_cost: self.state.total_energy * rate_per_kwh,
            ..self.state.clone()
        };
        debug!(rate_per_kwh, "electricity rate set");
        Ok(())
    }

    pub fn start_order(&mut self, client_name: &str, hectares: f64) -> SimResult<WateringOrder> {
        match self.orders.start(client_name, hectares, self.state.timestamp) {
            Ok(order) => {
                info!(
                    id = %order.id,
                    client = %order.client_name,
                    hectares = order.hectares,
                    target_m3 = order.target_volume,
                    "watering order started"
                );
                Ok(order.clone())
            }
            Err(e) => {
                warn!(error = %e, "watering order rejected");
                Err(e)
            }
        }
    }

    pub fn cancel_order(&mut self) -> SimResult<WateringOrder> {
        let order = self.orders.cancel(self.state.timestamp)?;
        info!(
            id = %order.id,
            delivered_m3 = order.delivered_volume,
            "watering order cancelled"
        );
        Ok(order)
    }
}
