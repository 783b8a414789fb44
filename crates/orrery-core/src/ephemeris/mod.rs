// crates/orrery-core/src/ephemeris/mod.rs

pub mod almanac;

use chrono::{DateTime, Utc};

use crate::angle::Angle;
use crate::axis::state::Axis;
use crate::error::Result;

/// Raw (orbital, rotation) angles as produced by an ephemeris, before the
/// reference pose is subtracted.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct RawAngles {
    pub orbital: Angle,
    pub rotation: Angle,
}

impl RawAngles {
    pub fn new(orbital_deg: f64, rotation_deg: f64) -> Self {
        Self {
            orbital: Angle::from_degrees(orbital_deg),
            rotation: Angle::from_degrees(rotation_deg),
        }
    }

    #[inline]
    pub fn get(&self, axis: Axis) -> Angle {
        match axis {
            Axis::Orbital => self.orbital,
            Axis::Rotation => self.rotation,
        }
    }
}

/// Pure function of time; the controller treats its output as ground truth.
pub trait AngleSource {
    fn angles_at(&self, t: DateTime<Utc>) -> Result<RawAngles>;
}

impl<T: AngleSource + ?Sized> AngleSource for &T {
    fn angles_at(&self, t: DateTime<Utc>) -> Result<RawAngles> {
        (**self).angles_at(t)
    }
}

impl<T: AngleSource + ?Sized> AngleSource for Box<T> {
    fn angles_at(&self, t: DateTime<Utc>) -> Result<RawAngles> {
        (**self).angles_at(t)
    }
}
