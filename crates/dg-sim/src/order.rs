//! Watering orders: volumetric delivery requests that force the gate open.

use chrono::{DateTime, Utc};
use dg_core::numeric::ensure_positive;
use dg_core::units::constants::M3_PER_HECTARE;
use dg_core::units::{Time, VolumeRate, as_m3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{SimError, SimResult};
use crate::power::PowerAccountant;

/// Lifecycle of an order. Only ACTIVE orders are ever mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Active,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WateringOrder {
    pub id: Uuid,
    pub client_name: String,
    pub hectares: f64,
    /// `hectares * 1000` (m³)
    pub target_volume: f64,
    /// Water released through the gate while active (m³)
    pub delivered_volume: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: OrderStatus,
    /// Motor energy attributable to this order (kWh)
    pub power_consumed: f64,
    /// `delivered_volume * water_cost_per_m3`
    pub water_cost: f64,
}

impl WateringOrder {
    /// New ACTIVE order. Rejects empty client names and non-positive or
    /// non-finite hectares.
    pub fn new(client_name: &str, hectares: f64, start_time: DateTime<Utc>) -> SimResult<Self> {
        let client_name = client_name.trim();
        if client_name.is_empty() {
            return Err(SimError::InvalidArg {
                what: "client name must not be empty",
            });
        }
        let hectares = ensure_positive(hectares, "hectares")?;
        Ok(Self {
            id: Uuid::new_v4(),
            client_name: client_name.to_string(),
            hectares,
            target_volume: hectares * M3_PER_HECTARE,
            delivered_volume: 0.0,
            start_time,
            end_time: None,
            status: OrderStatus::Active,
            power_consumed: 0.0,
            water_cost: 0.0,
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == OrderStatus::Active
    }

    pub fn is_fulfilled(&self) -> bool {
        self.delivered_volume >= self.target_volume
    }

    /// Accumulate one tick of delivery. Non-active orders are returned as is.
    pub fn accumulate(
        &self,
        outflow: VolumeRate,
        power_kw: f64,
        dt: Time,
        water_cost_per_m3: f64,
    ) -> Self {
        if !self.is_active() {
            return self.clone();
        }
        let delivered_volume = self.delivered_volume + as_m3(outflow * dt).max(0.0);
        Self {
            delivered_volume,
            power_consumed: self.power_consumed + PowerAccountant::energy_kwh(power_kw, dt),
            water_cost: delivered_volume * water_cost_per_m3,
            ..self.clone()
        }
    }
}

/// Holder of the single active order and the last completed one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBook {
    active: Option<WateringOrder>,
    last_completed: Option<WateringOrder>,
}

impl OrderBook {
    pub fn active(&self) -> Option<&WateringOrder> {
        self.active.as_ref()
    }

    pub fn last_completed(&self) -> Option<&WateringOrder> {
        self.last_completed.as_ref()
    }

    /// Open a new order. At most one order is active at a time.
    pub fn start(
        &mut self,
        client_name: &str,
        hectares: f64,
        now: DateTime<Utc>,
    ) -> SimResult<&WateringOrder> {
        if let Some(active) = &self.active {
            return Err(SimError::OrderAlreadyActive { id: active.id });
        }
        let order = WateringOrder::new(client_name, hectares, now)?;
        Ok(self.active.insert(order))
    }

    /// Store the per-tick progress of the active order.
    ///
    /// Ignored unless `order` is the active order and still ACTIVE.
    pub fn update_active(&mut self, order: WateringOrder) {
        match &self.active {
            Some(active) if active.id == order.id && order.is_active() => {
                self.active = Some(order);
            }
            _ => {}
        }
    }

    /// Promote the active order to COMPLETED once its volume is delivered.
    pub fn complete_if_fulfilled(&mut self, now: DateTime<Utc>) -> Option<WateringOrder> {
        let fulfilled = self.active.as_ref().is_some_and(WateringOrder::is_fulfilled);
        if !fulfilled {
            return None;
        }
        let mut order = self.active.take()?;
        order.status = OrderStatus::Completed;
        order.end_time = Some(now);
        self.last_completed = Some(order.clone());
        Some(order)
    }

    /// Cancel the active order. The cancelled order is returned and not kept.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> SimResult<WateringOrder> {
        let mut order = self.active.take().ok_or(SimError::NoActiveOrder)?;
        order.status = OrderStatus::Cancelled;
        order.end_time = Some(now);
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dg_core::units::{m3ps, s};

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-05-01T06:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn target_volume_from_hectares() {
        let order = WateringOrder::new("Finca Sur", 50.0, now()).unwrap();
        assert_eq!(order.target_volume, 50_000.0);
        assert_eq!(order.status, OrderStatus::Active);
        assert_eq!(order.delivered_volume, 0.0);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(WateringOrder::new("  ", 5.0, now()).is_err());
        assert!(WateringOrder::new("a", 0.0, now()).is_err());
        assert!(WateringOrder::new("a", -2.0, now()).is_err());
        assert!(WateringOrder::new("a", f64::NAN, now()).is_err());
    }

    #[test]
    fn accumulate_adds_volume_energy_and_cost() {
        let order = WateringOrder::new("a", 1.0, now()).unwrap();
        let next = order.accumulate(m3ps(20.0), 15.0, s(1.0), 0.05);
        assert!((next.delivered_volume - 20.0).abs() < 1e-12);
        assert!((next.power_consumed - 15.0 / 3600.0).abs() < 1e-12);
        assert_eq!(next.water_cost, next.delivered_volume * 0.05);
    }

    #[test]
    fn second_start_is_rejected_and_first_untouched() {
        let mut book = OrderBook::default();
        let first = book.start("a", 2.0, now()).unwrap().clone();
        let err = book.start("b", 9.0, now()).unwrap_err();
        assert_eq!(err, SimError::OrderAlreadyActive { id: first.id });
        assert_eq!(book.active(), Some(&first));
    }

    #[test]
    fn completes_only_once_fulfilled() {
        let mut book = OrderBook::default();
        let order = book.start("a", 1.0, now()).unwrap().clone();

        let partial = WateringOrder {
            delivered_volume: 999.9,
            ..order.clone()
        };
        book.update_active(partial);
        assert!(book.complete_if_fulfilled(now()).is_none());
        assert!(book.active().is_some());

        let full = WateringOrder {
            delivered_volume: 1000.0,
            ..order
        };
        book.update_active(full);
        let done = book.complete_if_fulfilled(now()).unwrap();
        assert_eq!(done.status, OrderStatus::Completed);
        assert_eq!(done.end_time, Some(now()));
        assert!(book.active().is_none());
        assert_eq!(book.last_completed(), Some(&done));
    }

    #[test]
    fn cancel_clears_slot_without_recording_completion() {
        let mut book = OrderBook::default();
        book.start("a", 1.0, now()).unwrap();
        let cancelled = book.cancel(now()).unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert!(book.active().is_none());
        assert!(book.last_completed().is_none());
        assert_eq!(book.cancel(now()), Err(SimError::NoActiveOrder));
    }

    #[test]
    fn stale_update_is_ignored() {
        let mut book = OrderBook::default();
        let stale = book.start("a", 1.0, now()).unwrap().clone();
        book.cancel(now()).unwrap();
        book.start("b", 1.0, now()).unwrap();
        book.update_active(WateringOrder {
            delivered_volume: 5000.0,
            ..stale
        });
        assert_eq!(book.active().map(|o| o.delivered_volume), Some(0.0));
    }
}
