// crates/orrery-core/src/angle.rs

use std::fmt;

pub const FULL_TURN_DEG: f64 = 360.0;

/// Wrap any finite degree value into [0, 360).
#[inline]
pub fn normalize(deg: f64) -> f64 {
    let r = deg.rem_euclid(FULL_TURN_DEG);
    // rem_euclid of a tiny negative value rounds up to exactly 360.0
    if r >= FULL_TURN_DEG {
        0.0
    } else {
        r
    }
}

/// Degrees, always stored normalized to [0, 360).
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
pub struct Angle(f64);

impl Angle {
    pub const ZERO: Angle = Angle(0.0);

    #[inline]
    pub fn from_degrees(deg: f64) -> Angle {
        Angle(normalize(deg))
    }

    #[inline]
    pub fn degrees(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn wrapping_add(self, other: Angle) -> Angle {
        Angle::from_degrees(self.0 + other.0)
    }

    #[inline]
    pub fn wrapping_sub(self, other: Angle) -> Angle {
        Angle::from_degrees(self.0 - other.0)
    }

    /// Minimal circular distance, in [0, 180].
    #[inline]
    pub fn distance(self, other: Angle) -> f64 {
        let d = self.wrapping_sub(other).0;
        d.min(FULL_TURN_DEG - d)
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}°", self.0)
    }
}
