//! Core traits for discharge elements.

use crate::error::HydraulicsResult;
use dg_core::units::{Length, Ratio, VolumeRate};

/// Trait for elements that discharge water out of the reservoir.
///
/// Elements are deterministic functions of upstream head and opening.
pub trait DischargeElement: Send + Sync {
    /// Element name for debugging and identification.
    fn name(&self) -> &str;

    /// Volumetric discharge for a given upstream head above the element sill
    /// and a fractional opening in `[0, 1]`.
    ///
    /// Never negative. Dry sill or closed element returns exactly zero.
    fn discharge(&self, head: Length, opening: Ratio) -> HydraulicsResult<VolumeRate>;
}
