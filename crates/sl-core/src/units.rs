// sl-core/src/units.rs

use uom::si::f64::{
    Acceleration as UomAcceleration, Force as UomForce, Length as UomLength, Mass as UomMass,
    Power as UomPower, Time as UomTime, Velocity as UomVelocity,
};

// Public canonical unit types (SI, f64)
pub type Accel = UomAcceleration;
pub type Force = UomForce;
pub type Length = UomLength;
pub type Mass = UomMass;
pub type Power = UomPower;
pub type Time = UomTime;
pub type Velocity = UomVelocity;

#[inline]
pub fn kg(v: f64) -> Mass {
    use uom::si::mass::kilogram;
    Mass::new::<kilogram>(v)
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

#[inline]
pub fn mps2(v: f64) -> Accel {
    use uom::si::acceleration::meter_per_second_squared;
    Accel::new::<meter_per_second_squared>(v)
}

#[inline]
pub fn n(v: f64) -> Force {
    use uom::si::force::newton;
    Force::new::<newton>(v)
}

#[inline]
pub fn w(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v)
}

/// Speed in miles per hour.
#[inline]
pub fn to_mph(v: Velocity) -> f64 {
    use uom::si::velocity::mile_per_hour;
    v.get::<mile_per_hour>()
}

/// Length in international feet.
#[inline]
pub fn to_ft(l: Length) -> f64 {
    use uom::si::length::foot;
    l.get::<foot>()
}

pub mod constants {
    use super::*;

    /// Gravity used by the reference vehicle model.
    pub const G_MPS2: f64 = 9.81;

    #[inline]
    pub fn g() -> Accel {
        mps2(G_MPS2)
    }
}
