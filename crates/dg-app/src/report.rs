//! Order reports and the background export worker.
//!
//! Exports run on their own thread. A failing reporter never reaches the
//! simulation actor; it turns into a `ReportMessage::Fallback`.

use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::{self, JoinHandle};

use chrono::{DateTime, Utc};
use dg_sim::{OrderStatus, Tariffs, WateringOrder};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Billing summary of a completed watering order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReport {
    pub order_id: Uuid,
    pub client_name: String,
    pub hectares: f64,
    pub target_volume_m3: f64,
    pub delivered_volume_m3: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_s: f64,
    pub power_consumed_kwh: f64,
    pub elec_rate_per_kwh: f64,
    pub water_cost_per_m3: f64,
    /// `power_consumed_kwh * elec_rate_per_kwh`
    pub energy_cost: f64,
    /// `delivered_volume_m3 * water_cost_per_m3`
    pub water_cost: f64,
    pub total_cost: f64,
}

impl OrderReport {
    /// Build the report for a completed order at the given tariffs.
    pub fn from_order(order: &WateringOrder, tariffs: &Tariffs) -> AppResult<Self> {
        if order.status != OrderStatus::Completed {
            return Err(AppError::InvalidInput(format!(
                "order {} is not completed",
                order.id
            )));
        }
        let end_time = order.end_time.ok_or_else(|| {
            AppError::InvalidInput(format!("order {} has no end time", order.id))
        })?;
        let duration_s = (end_time - order.start_time).num_milliseconds() as f64 / 1000.0;
        let energy_cost = order.power_consumed * tariffs.elec_rate_per_kwh;
        let water_cost = order.delivered_volume * tariffs.water_cost_per_m3;
        Ok(Self {
            order_id: order.id,
            client_name: order.client_name.clone(),
            hectares: order.hectares,
            target_volume_m3: order.target_volume,
            delivered_volume_m3: order.delivered_volume,
            start_time: order.start_time,
            end_time,
            duration_s,
            power_consumed_kwh: order.power_consumed,
            elec_rate_per_kwh: tariffs.elec_rate_per_kwh,
            water_cost_per_m3: tariffs.water_cost_per_m3,
            energy_cost,
            water_cost,
            total_cost: energy_cost + water_cost,
        })
    }
}

/// Export collaborator for completed orders.
pub trait OrderReporter: Send {
    /// Export a report and return where it went.
    fn export(&mut self, report: &OrderReport) -> AppResult<String>;
}

/// Writes each report as pretty JSON into a directory.
#[derive(Debug, Clone)]
pub struct JsonReporter {
    dir: PathBuf,
}

impl JsonReporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, order_id: Uuid) -> PathBuf {
        self.dir.join(format!("order-{order_id}.json"))
    }
}

impl OrderReporter for JsonReporter {
    fn export(&mut self, report: &OrderReport) -> AppResult<String> {
        let path = self.path_for(report.order_id);
        std::fs::create_dir_all(&self.dir).map_err(|source| AppError::ReportWrite {
            path: self.dir.clone(),
            source,
        })?;
        let content = serde_json::to_string_pretty(report)?;
        std::fs::write(&path, content).map_err(|source| AppError::ReportWrite {
            path: path.clone(),
            source,
        })?;
        Ok(path.display().to_string())
    }
}

/// Outcome of one export.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportMessage {
    Exported { order_id: Uuid, location: String },
    /// The export failed; `message` is shown to the operator instead.
    Fallback { order_id: Uuid, message: String },
}

/// Background thread running an `OrderReporter`.
pub struct ReportWorker {
    tx: Option<Sender<OrderReport>>,
    handle: Option<JoinHandle<()>>,
}

impl ReportWorker {
    /// Spawn the worker. `notify` receives the outcome of every export.
    pub fn start<F>(reporter: Box<dyn OrderReporter>, notify: F) -> Self
    where
        F: Fn(ReportMessage) + Send + 'static,
    {
        let (tx, rx) = channel();
        let handle = thread::spawn(move || Self::run(reporter, rx, notify));
        Self {
            tx: Some(tx),
            handle: Some(handle),
        }
    }

    fn run<F>(mut reporter: Box<dyn OrderReporter>, rx: Receiver<OrderReport>, notify: F)
    where
        F: Fn(ReportMessage),
    {
        for report in rx {
            let order_id = report.order_id;
            let message = match reporter.export(&report) {
                Ok(location) => {
                    info!(%order_id, %location, "order report exported");
                    ReportMessage::Exported { order_id, location }
                }
                Err(e) => {
                    warn!(%order_id, error = %e, "order report export failed");
                    ReportMessage::Fallback {
                        order_id,
                        message: format!(
                            "Report for {} could not be exported ({e}). \
                             Delivered {:.0} m³, total cost {:.2}.",
                            report.client_name, report.delivered_volume_m3, report.total_cost
                        ),
                    }
                }
            };
            notify(message);
        }
    }

    /// Queue a report. Never blocks.
    pub fn submit(&self, report: OrderReport) -> AppResult<()> {
        self.tx
            .as_ref()
            .ok_or(AppError::ActorStopped)?
            .send(report)
            .map_err(|_| AppError::Report {
                message: "report worker has stopped".to_string(),
            })
    }

    /// Finish queued exports and join the thread.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("report worker panicked");
            }
        }
    }
}

impl Drop for ReportWorker {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dg_sim::OrderBook;
    use std::sync::mpsc;
    use std::time::Duration;

    fn completed_order() -> WateringOrder {
        let start = DateTime::parse_from_rfc3339("2026-05-01T06:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let mut book = OrderBook::default();
        let order = book.start("Finca Sur", 2.0, start).unwrap().clone();
        book.update_active(WateringOrder {
            delivered_volume: 2_010.0,
            power_consumed: 0.4,
            ..order
        });
        book.complete_if_fulfilled(start + chrono::TimeDelta::seconds(90))
            .unwrap()
    }

    struct FailingReporter;

    impl OrderReporter for FailingReporter {
        fn export(&mut self, _report: &OrderReport) -> AppResult<String> {
            Err(AppError::Report {
                message: "printer on fire".to_string(),
            })
        }
    }

    #[test]
    fn report_costs() {
        let report = OrderReport::from_order(&completed_order(), &Tariffs::default()).unwrap();
        assert_eq!(report.duration_s, 90.0);
        assert!((report.energy_cost - 0.4 * 0.15).abs() < 1e-12);
        assert!((report.water_cost - 2_010.0 * 0.05).abs() < 1e-9);
        assert_eq!(report.total_cost, report.energy_cost + report.water_cost);
    }

    #[test]
    fn active_order_has_no_report() {
        let order = WateringOrder::new("a", 1.0, Utc::now()).unwrap();
        assert!(OrderReport::from_order(&order, &Tariffs::default()).is_err());
    }

    #[test]
    fn json_reporter_writes_file() {
        let dir = std::env::temp_dir().join("dg_app_report_test");
        let report = OrderReport::from_order(&completed_order(), &Tariffs::default()).unwrap();
        let mut reporter = JsonReporter::new(&dir);
        let location = reporter.export(&report).unwrap();
        let content = std::fs::read_to_string(&location).unwrap();
        let back: OrderReport = serde_json::from_str(&content).unwrap();
        assert_eq!(back.order_id, report.order_id);
        assert_eq!(back.client_name, "Finca Sur");
    }

    #[test]
    fn failure_becomes_fallback_message() {
        let (tx, rx) = mpsc::channel();
        let worker = ReportWorker::start(Box::new(FailingReporter), move |m| {
            let _ = tx.send(m);
        });
        let report = OrderReport::from_order(&completed_order(), &Tariffs::default()).unwrap();
        worker.submit(report.clone()).unwrap();

        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            ReportMessage::Fallback { order_id, message } => {
                assert_eq!(order_id, report.order_id);
                assert!(message.contains("Finca Sur"));
            }
            other => panic!("unexpected {other:?}"),
        }
        worker.shutdown();
    }
}
