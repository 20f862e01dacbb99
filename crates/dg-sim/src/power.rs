//! Gate motor power and energy accounting.

use dg_core::units::{Energy, Time, as_kwh, kw};

use crate::params::MotorParams;

/// Power figures after one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerReading {
    /// Motor draw during the tick (kW)
    pub current_power_kw: f64,
    /// Energy used during the tick (kWh)
    pub energy_increment_kwh: f64,
    /// Cumulative energy (kWh)
    pub total_energy_kwh: f64,
    /// Cumulative cost, `total_energy * rate`
    pub total_cost: f64,
}

/// Two-level motor model: full draw while travelling, standby otherwise.
///
/// Cost is never accumulated incrementally. It is recomputed from the
/// cumulative energy at the rate in force, so a rate change reprices all
/// historical energy.
#[derive(Debug, Clone)]
pub struct PowerAccountant {
    motor: MotorParams,
}

impl PowerAccountant {
    pub fn new(motor: MotorParams) -> Self {
        Self { motor }
    }

    pub fn power_kw(&self, is_moving: bool) -> f64 {
        if is_moving {
            self.motor.active_kw
        } else {
            self.motor.standby_kw
        }
    }

    /// Energy drawn at `power_kw` over `dt` (kWh).
    pub fn energy_kwh(power_kw: f64, dt: Time) -> f64 {
        let e: Energy = kw(power_kw) * dt;
        as_kwh(e)
    }

    pub fn account(
        &self,
        previous_total_kwh: f64,
        is_moving: bool,
        dt: Time,
        elec_rate_per_kwh: f64,
    ) -> PowerReading {
        let current_power_kw = self.power_kw(is_moving);
        let energy_increment_kwh = Self::energy_kwh(current_power_kw, dt).max(0.0);
        let total_energy_kwh = previous_total_kwh + energy_increment_kwh;
        PowerReading {
            current_power_kw,
            energy_increment_kwh,
            total_energy_kwh,
            total_cost: total_energy_kwh * elec_rate_per_kwh,
        }
    }
}
