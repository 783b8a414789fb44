// crates/orrery-core/src/ephemeris/almanac.rs
//
// Low-precision solar almanac (Meeus ch. 25 / IAU 1982 GMST).
//
//   orbital  = apparent geocentric ecliptic longitude of the Sun, λ
//   rotation = H - λ, with H the Greenwich hour angle of the Sun (0 at
//              apparent solar noon)
//
// The rotation motor rides on the orbital arm, so its angle is the solar
// hour angle less the arm's own travel.
//
// Accuracy is a few arcminutes in λ and a few seconds of time in H, far finer
// than one motor step (1.8° at 200 steps/rev).

use chrono::{DateTime, Datelike, Utc};

use crate::angle::Angle;
use crate::ephemeris::{AngleSource, RawAngles};
use crate::error::{ControlError, Result};

pub const J2000_JD: f64 = 2_451_545.0;
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;
pub const SECONDS_PER_DAY: f64 = 86_400.0;
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;

pub const GMST_BASE_DEG: f64 = 280.460_618_37;
pub const GMST_ROTATION_PER_DAY: f64 = 360.985_647_366_29;
pub const GMST_CORRECTION: f64 = 0.000_387_933;

/// Years outside this span are rejected: the series terms degrade quickly.
pub const VALID_YEARS: std::ops::RangeInclusive<i32> = 1800..=2200;

#[derive(Clone, Copy, Debug, Default)]
pub struct SolarAlmanac;

impl SolarAlmanac {
    pub fn new() -> Self {
        SolarAlmanac
    }
}

impl AngleSource for SolarAlmanac {
    fn angles_at(&self, t: DateTime<Utc>) -> Result<RawAngles> {
        if !VALID_YEARS.contains(&t.year()) {
            return Err(ControlError::EphemerisUnavailable(format!(
                "{} is outside the almanac range {}..={}",
                t.to_rfc3339(),
                VALID_YEARS.start(),
                VALID_YEARS.end()
            )));
        }
        let lambda = solar_longitude(t);
        let hour_angle = greenwich_hour_angle(t);
        Ok(RawAngles {
            orbital: lambda,
            rotation: hour_angle.wrapping_sub(lambda),
        })
    }
}

pub fn julian_date(t: DateTime<Utc>) -> f64 {
    t.timestamp_millis() as f64 / (1000.0 * SECONDS_PER_DAY) + UNIX_EPOCH_JD
}

fn centuries_since_j2000(t: DateTime<Utc>) -> f64 {
    (julian_date(t) - J2000_JD) / DAYS_PER_JULIAN_CENTURY
}

/// Apparent ecliptic longitude of the Sun.
pub fn solar_longitude(t: DateTime<Utc>) -> Angle {
    Angle::from_degrees(apparent_longitude_deg(centuries_since_j2000(t)))
}

fn apparent_longitude_deg(t: f64) -> f64 {
    let l0 = 280.46646 + 36000.76983 * t + 0.0003032 * t * t;
    let m = (357.52911 + 35999.05029 * t - 0.0001537 * t * t).to_radians();

    let c = (1.914602 - 0.004817 * t - 0.000014 * t * t) * m.sin()
        + (0.019993 - 0.000101 * t) * (2.0 * m).sin()
        + 0.000289 * (3.0 * m).sin();

    let omega = (125.04 - 1934.136 * t).to_radians();
    l0 + c - 0.00569 - 0.00478 * omega.sin()
}

fn apparent_obliquity_deg(t: f64) -> f64 {
    let eps0_arcsec = 84381.448 - 46.8150 * t - 0.00059 * t * t + 0.001813 * t * t * t;
    let omega = (125.04 - 1934.136 * t).to_radians();
    eps0_arcsec / 3600.0 + 0.00256 * omega.cos()
}

/// Right ascension of the Sun.
pub fn solar_right_ascension(t: DateTime<Utc>) -> Angle {
    let c = centuries_since_j2000(t);
    let lambda = apparent_longitude_deg(c).to_radians();
    let eps = apparent_obliquity_deg(c).to_radians();
    let alpha = (eps.cos() * lambda.sin()).atan2(lambda.cos());
    Angle::from_degrees(alpha.to_degrees())
}

/// Greenwich mean sidereal time.
pub fn greenwich_mean_sidereal_time(t: DateTime<Utc>) -> Angle {
    let days = julian_date(t) - J2000_JD;
    let c = days / DAYS_PER_JULIAN_CENTURY;
    let gmst = GMST_BASE_DEG + GMST_ROTATION_PER_DAY * days + GMST_CORRECTION * c * c
        - c * c * c / 38_710_000.0;
    Angle::from_degrees(gmst)
}

/// Hour angle of the Sun at Greenwich; 0 at apparent solar noon, 180 at nadir.
pub fn greenwich_hour_angle(t: DateTime<Utc>) -> Angle {
    greenwich_mean_sidereal_time(t).wrapping_sub(solar_right_ascension(t))
}

/// Rotation with the arm's travel added back: the solar hour angle.
pub fn effective_rotation(raw: &RawAngles) -> Angle {
    raw.rotation.wrapping_add(raw.orbital)
}
