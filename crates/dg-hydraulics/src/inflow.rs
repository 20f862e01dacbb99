//! Reservoir inflow: base river flow, rain contribution and bounded noise.

use crate::common::check_finite;
use crate::error::{HydraulicsError, HydraulicsResult};
use dg_core::units::{VolumeRate, m3ps};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Base river flow of the reference catchment (m³/s).
pub const REFERENCE_BASE_INFLOW_M3PS: f64 = 36.0;
/// Extra inflow per unit of rainfall intensity (m³/s).
pub const REFERENCE_RAIN_GAIN: f64 = 0.3;
/// Half-width of the uniform inflow perturbation (m³/s).
pub const REFERENCE_NOISE_AMPLITUDE_M3PS: f64 = 1.0;

/// Rain condition over the catchment.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rainfall {
    pub is_raining: bool,
    pub intensity: f64,
}

impl Rainfall {
    pub fn dry() -> Self {
        Self::default()
    }
}

/// Inflow model: `base + rain + noise`, floored at zero.
///
/// The perturbation is drawn from a ChaCha stream keyed by the tick index, so
/// the same `(seed, tick)` pair always yields the same inflow. No generator
/// state survives between ticks.
#[derive(Debug, Clone)]
pub struct InflowModel {
    /// Base river flow
    pub base: VolumeRate,
    /// Inflow per unit of rainfall intensity (m³/s)
    pub rain_gain: f64,
    /// Noise half-width; zero disables noise
    pub noise_amplitude: VolumeRate,
    /// Seed of the perturbation sequence
    pub seed: u64,
}

impl InflowModel {
    /// Create a new inflow model.
    pub fn new(
        base: VolumeRate,
        rain_gain: f64,
        noise_amplitude: VolumeRate,
        seed: u64,
    ) -> HydraulicsResult<Self> {
        if !(base.value.is_finite() && base.value >= 0.0) {
            return Err(HydraulicsError::InvalidArg {
                what: "base inflow must be non-negative",
            });
        }
        if !(rain_gain.is_finite() && rain_gain >= 0.0) {
            return Err(HydraulicsError::InvalidArg {
                what: "rain gain must be non-negative",
            });
        }
        if !(noise_amplitude.value.is_finite() && noise_amplitude.value >= 0.0) {
            return Err(HydraulicsError::InvalidArg {
                what: "noise amplitude must be non-negative",
            });
        }
        Ok(Self {
            base,
            rain_gain,
            noise_amplitude,
            seed,
        })
    }

    /// Reference catchment with the given noise seed.
    pub fn reference(seed: u64) -> Self {
        Self {
            base: m3ps(REFERENCE_BASE_INFLOW_M3PS),
            rain_gain: REFERENCE_RAIN_GAIN,
            noise_amplitude: m3ps(REFERENCE_NOISE_AMPLITUDE_M3PS),
            seed,
        }
    }

    /// Noise-free variant, useful for analytic checks.
    pub fn without_noise(mut self) -> Self {
        self.noise_amplitude = m3ps(0.0);
        self
    }

    /// Rain contribution (m³/s).
    pub fn rain_effect(&self, rain: Rainfall) -> f64 {
        if rain.is_raining {
            rain.intensity.max(0.0) * self.rain_gain
        } else {
            0.0
        }
    }

    /// Perturbation for a tick, uniform in `[-amplitude, amplitude]` (m³/s).
    pub fn noise(&self, tick: u64) -> f64 {
        let amplitude = self.noise_amplitude.value;
        if amplitude <= 0.0 {
            return 0.0;
        }
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream(tick);
        rng.gen_range(-1.0..=1.0) * amplitude
    }

    /// Inflow for a tick.
    pub fn inflow(&self, tick: u64, rain: Rainfall) -> HydraulicsResult<VolumeRate> {
        check_finite(rain.intensity, "rainfall intensity")?;
        let q = self.base.value + self.rain_effect(rain) + self.noise(tick);
        check_finite(q, "inflow")?;
        Ok(m3ps(q.max(0.0)))
    }
}
