//! dg-core: stable foundation for damgate.
//!
//! Contains:
//! - units (uom SI types + constructors for hydraulic and electrical quantities)
//! - numeric (Real + finite/range checks + bounded clamps)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use units::*;
