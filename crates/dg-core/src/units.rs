// dg-core/src/units.rs

use uom::si::f64::{
    Area as UomArea, Energy as UomEnergy, Length as UomLength, Power as UomPower,
    Ratio as UomRatio, Time as UomTime, Volume as UomVolume, VolumeRate as UomVolumeRate,
};

// Public canonical unit types (SI, f64)
pub type Area = UomArea;
pub type Energy = UomEnergy;
pub type Length = UomLength;
pub type Power = UomPower;
pub type Ratio = UomRatio;
pub type Time = UomTime;
pub type Volume = UomVolume;
pub type VolumeRate = UomVolumeRate;

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn m2(v: f64) -> Area {
    use uom::si::area::square_meter;
    Area::new::<square_meter>(v)
}

#[inline]
pub fn m3ps(v: f64) -> VolumeRate {
    use uom::si::volume_rate::cubic_meter_per_second;
    VolumeRate::new::<cubic_meter_per_second>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn ms(v: f64) -> Time {
    use uom::si::time::millisecond;
    Time::new::<millisecond>(v)
}

#[inline]
pub fn kw(v: f64) -> Power {
    use uom::si::power::kilowatt;
    Power::new::<kilowatt>(v)
}

#[inline]
pub fn percent(v: f64) -> Ratio {
    use uom::si::ratio::percent;
    Ratio::new::<percent>(v)
}

// Accessors in the units used by snapshots and reports.

#[inline]
pub fn as_m(v: Length) -> f64 {
    v.get::<uom::si::length::meter>()
}

#[inline]
pub fn as_m3(v: Volume) -> f64 {
    v.get::<uom::si::volume::cubic_meter>()
}

#[inline]
pub fn as_m3ps(v: VolumeRate) -> f64 {
    v.get::<uom::si::volume_rate::cubic_meter_per_second>()
}

#[inline]
pub fn as_s(v: Time) -> f64 {
    v.get::<uom::si::time::second>()
}

#[inline]
pub fn as_kwh(v: Energy) -> f64 {
    v.get::<uom::si::energy::kilowatt_hour>()
}

pub mod constants {
    /// Gravitational acceleration used by the discharge equations.
    pub const G_MPS2: f64 = 9.81;

    /// Hectare to irrigation volume: 1000 m³ per hectare.
    pub const M3_PER_HECTARE: f64 = 1000.0;
}
