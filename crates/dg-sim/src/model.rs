//! The per-tick state transition.

use dg_controls::{ControlInput, ControlMode, GateActuator, LevelControlLaw};
use dg_core::numeric::{clamp_non_negative, clamp_percent};
use dg_core::units::{as_m, as_m3ps, as_s, m, m2, m3ps, percent};
use dg_hydraulics::{
    DischargeElement, DownstreamChannel, InflowModel, Rainfall, Reservoir, SluiceGate,
};

use crate::error::SimResult;
use crate::order::WateringOrder;
use crate::params::{ModelParams, Tariffs};
use crate::power::PowerAccountant;
use crate::state::{SimulationConfig, SystemState};

/// Per-tick inputs besides the previous state.
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    pub mode: ControlMode,
    pub config: &'a SimulationConfig,
    pub tariffs: &'a Tariffs,
    /// The order active when the tick starts, read fresh for every tick.
    pub active_order: Option<&'a WateringOrder>,
}

/// New state plus the accumulated active order, if there is one.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub state: SystemState,
    pub order: Option<WateringOrder>,
}

/// Compiled plant: typed elements built from `ModelParams`.
#[derive(Debug, Clone)]
pub struct DamModel {
    gate: SluiceGate,
    reservoir: Reservoir,
    inflow: InflowModel,
    downstream: DownstreamChannel,
    actuator: GateActuator,
    law: LevelControlLaw,
    power: PowerAccountant,
}

impl DamModel {
    pub fn from_params(params: &ModelParams) -> SimResult<Self> {
        params.validate()?;
        let p = &params.plant;
        Ok(Self {
            gate: SluiceGate::new(
                "main gate",
                p.discharge_coefficient,
                m(p.gate_width_m),
                m(p.max_gate_height_m),
            )?,
            reservoir: Reservoir::new(m2(p.reservoir_area_m2), m(p.max_water_level_m))?,
            inflow: InflowModel::new(
                m3ps(p.base_inflow_m3ps),
                p.rain_gain,
                m3ps(p.noise_amplitude_m3ps),
                params.noise_seed,
            )?,
            downstream: DownstreamChannel::new(
                m(p.downstream_base_m),
                p.downstream_gain,
                p.downstream_smoothing,
            )?,
            actuator: GateActuator::new(p.gate_speed_pct_per_tick)?,
            law: params.control.clone(),
            power: PowerAccountant::new(params.motor.clone()),
        })
    }

    pub fn max_water_level_m(&self) -> f64 {
        as_m(self.reservoir.max_level)
    }

    /// Advance one tick.
    ///
    /// Order of evaluation: control law on the previous state, actuator step,
    /// inflow and gate discharge (previous level, new gate position), level
    /// updates, power, then order accumulation.
    pub fn step(&self, prev: &SystemState, ctx: &TickContext<'_>) -> SimResult<TickOutcome> {
        let dt = ctx.config.dt();
        let tick = prev.tick + 1;
        let has_active_order = ctx.active_order.is_some_and(WateringOrder::is_active);

        let target = self.law.next_target(&ControlInput {
            mode: ctx.mode,
            has_active_order,
            target_level: ctx.config.target_level,
            water_level: prev.water_level,
            gate_opening: prev.gate_opening,
            target_gate_opening: prev.target_gate_opening,
        });

        let gate_step = self.actuator.step(prev.gate_opening, target);

        let rain = Rainfall {
            is_raining: prev.is_raining,
            intensity: prev.rainfall_intensity,
        };
        let inflow = self.inflow.inflow(tick, rain)?;
        let outflow = self
            .gate
            .discharge(m(prev.water_level), percent(gate_step.position))?;

        let level = self
            .reservoir
            .next_level(m(prev.water_level), inflow, outflow, dt)?;
        let downstream = self
            .downstream
            .next_level(m(prev.downstream_level), outflow)?;

        let power = self.power.account(
            prev.total_energy,
            gate_step.is_moving,
            dt,
            ctx.tariffs.elec_rate_per_kwh,
        );

        let order = ctx.active_order.filter(|o| o.is_active()).map(|o| {
            o.accumulate(
                outflow,
                power.current_power_kw,
                dt,
                ctx.tariffs.water_cost_per_m3,
            )
        });

        let state = SystemState {
            tick,
            elapsed_s: prev.elapsed_s + as_s(dt),
            timestamp: prev.next_timestamp(ctx.config.simulation_speed_ms),
            water_level: clamp_non_negative(as_m(level), self.max_water_level_m()),
            downstream_level: as_m(downstream).max(0.0),
            inflow_rate: as_m3ps(inflow).max(0.0),
            outflow_rate: as_m3ps(outflow).max(0.0),
            gate_opening: clamp_percent(gate_step.position),
            target_gate_opening: clamp_percent(target),
            gate_status: gate_step.status,
            is_raining: prev.is_raining,
            rainfall_intensity: prev.rainfall_intensity,
            current_power: power.current_power_kw,
            total_energy: power.total_energy_kwh,
            total_cost: power.total_cost,
        };

        tracing::trace!(
            tick,
            level = state.water_level,
            gate = state.gate_opening,
            target = state.target_gate_opening,
            outflow = state.outflow_rate,
            "tick"
        );

        Ok(TickOutcome { state, order })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::InitialConditions;
    use chrono::Utc;

    fn quiet_params() -> ModelParams {
        let mut p = ModelParams::default();
        p.plant.noise_amplitude_m3ps = 0.0;
        p
    }

    fn state(level: f64, gate: f64) -> SystemState {
        let init = InitialConditions {
            water_level_m: level,
            downstream_level_m: 0.5,
            gate_opening_pct: gate,
        };
        SystemState::initial(&init, 10.0, Utc::now())
    }

    fn step(model: &DamModel, prev: &SystemState, mode: ControlMode, setpoint: f64) -> TickOutcome {
        let config = SimulationConfig {
            target_level: setpoint,
            simulation_speed_ms: 1000,
        };
        let tariffs = Tariffs::default();
        let ctx = TickContext {
            mode,
            config: &config,
            tariffs: &tariffs,
            active_order: None,
        };
        model.step(prev, &ctx).unwrap()
    }

    #[test]
    fn auto_high_level_raises_target_by_gain() {
        let model = DamModel::from_params(&quiet_params()).unwrap();
        let out = step(&model, &state(6.0, 30.0), ControlMode::Auto, 5.0);
        assert!((out.state.target_gate_opening - 35.0).abs() < 1e-12);
        assert_eq!(out.state.gate_opening, 32.0);
        assert_eq!(out.state.gate_status, dg_controls::GateStatus::Opening);
        assert_eq!(out.state.current_power, 15.0);
    }

    #[test]
    fn auto_low_level_lowers_target_by_two() {
        let model = DamModel::from_params(&quiet_params()).unwrap();
        let out = step(&model, &state(4.5, 30.0), ControlMode::Auto, 5.0);
        assert_eq!(out.state.target_gate_opening, 28.0);
        assert_eq!(out.state.gate_opening, 28.0);
    }

    #[test]
    fn closed_gate_has_zero_outflow_and_standby_power() {
        let model = DamModel::from_params(&quiet_params()).unwrap();
        let out = step(&model, &state(9.0, 0.0), ControlMode::Manual, 5.0);
        assert_eq!(out.state.outflow_rate, 0.0);
        assert_eq!(out.state.gate_status, dg_controls::GateStatus::Closed);
        assert_eq!(out.state.current_power, 0.5);
        assert!((out.state.water_level - 9.036).abs() < 1e-9);
    }

    #[test]
    fn tick_advances_clock() {
        let model = DamModel::from_params(&quiet_params()).unwrap();
        let prev = state(5.0, 0.0);
        let out = step(&model, &prev, ControlMode::Manual, 5.0);
        assert_eq!(out.state.tick, 1);
        assert_eq!(out.state.elapsed_s, 1.0);
        assert_eq!(
            out.state.timestamp - prev.timestamp,
            chrono::TimeDelta::seconds(1)
        );
    }
}
