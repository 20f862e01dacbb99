//! Simulation core for damgate.
//!
//! Couples the hydraulic elements of `dg-hydraulics` with the control
//! primitives of `dg-controls` into a deterministic per-tick state
//! transition, and tracks gate motor energy and volumetric watering orders.
//!
//! - [`DamModel`] is the pure tick function: previous state in, next state
//!   out.
//! - [`Simulation`] owns the state, the mode and the order book, and is the
//!   only place where they change.
//!
//! ```
//! use dg_sim::Simulation;
//!
//! let mut sim = Simulation::with_defaults().unwrap();
//! let summary = sim.tick().unwrap();
//! assert_eq!(summary.state.tick, 1);
//! ```

pub mod error;
pub mod model;
pub mod order;
pub mod params;
pub mod power;
pub mod simulation;
pub mod state;

pub use error::{SimError, SimResult};
pub use model::{DamModel, TickContext, TickOutcome};
pub use order::{OrderBook, OrderStatus, WateringOrder};
pub use params::{DEFAULT_NOISE_SEED, ModelParams, MotorParams, PlantParams, Tariffs};
pub use power::{PowerAccountant, PowerReading};
pub use simulation::{AlertChange, Simulation, SimulationSnapshot, TickSummary};
pub use state::{
    InitialConditions, MAX_SIMULATION_SPEED_MS, MIN_SIMULATION_SPEED_MS, SimulationConfig,
    SystemState,
};
