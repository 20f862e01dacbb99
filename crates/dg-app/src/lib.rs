//! Live session layer for damgate.
//!
//! Runs a `Simulation` in real time for both the CLI and any operator
//! front end: one actor thread applies commands and ticks serially, a
//! deadline scheduler decides when ticks and jog repeats are due, and a
//! report worker exports completed orders off the critical path.

pub mod actor;
pub mod error;
pub mod report;
pub mod scheduler;
pub mod timer;

pub use actor::{ActorOptions, Command, SessionStatus, SimEvent, SimulationHandle};
pub use error::{AppError, AppResult};
pub use report::{JsonReporter, OrderReport, OrderReporter, ReportMessage, ReportWorker};
pub use scheduler::{ScheduledAction, TickScheduler};
pub use timer::PeriodicTimer;
