use approx::assert_abs_diff_eq;
use chrono::{DateTime, TimeZone, Utc};
use orrery_core::config::defaults::reference_instant;
use orrery_core::ephemeris::almanac::{
    effective_rotation, greenwich_hour_angle, julian_date, solar_longitude, SolarAlmanac,
};
use orrery_core::{Angle, AngleSource, ControlError};

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

/// Signed difference folded into (-180, 180].
fn off(a: Angle, expected: f64) -> f64 {
    let d = a.wrapping_sub(Angle::from_degrees(expected)).degrees();
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}

fn assert_near(a: Angle, expected: f64, tol: f64) {
    assert_abs_diff_eq!(off(a, expected), 0.0, epsilon = tol);
}

#[test]
fn julian_date_of_j2000() {
    assert_abs_diff_eq!(
        julian_date(at(2000, 1, 1, 12, 0, 0)),
        2_451_545.0,
        epsilon = 1e-9
    );
}

#[test]
fn solar_longitude_at_solstices_and_equinox() {
    // December solstice 2023-12-22 03:27 UTC.
    assert_near(solar_longitude(at(2023, 12, 22, 3, 27, 0)), 270.0, 0.05);
    // March equinox 2024-03-20 03:06 UTC.
    assert_near(solar_longitude(at(2024, 3, 20, 3, 6, 0)), 0.0, 0.05);
    // June solstice 2024-06-20 20:51 UTC.
    assert_near(solar_longitude(at(2024, 6, 20, 20, 51, 0)), 90.0, 0.05);
}

#[test]
fn hour_angle_is_zero_at_apparent_noon() {
    // Equation of time near its extremes: noon at 12:14:13 and 11:43:36 UTC.
    assert_near(greenwich_hour_angle(at(2024, 2, 11, 12, 14, 13)), 0.0, 0.25);
    assert_near(greenwich_hour_angle(at(2024, 11, 3, 11, 43, 36)), 0.0, 0.25);
}

#[test]
fn hour_angle_advances_fifteen_degrees_an_hour() {
    let t = at(2024, 5, 1, 6, 0, 0);
    let a = greenwich_hour_angle(t);
    let b = greenwich_hour_angle(t + chrono::Duration::hours(1));
    assert_abs_diff_eq!(b.wrapping_sub(a).degrees(), 15.0, epsilon = 0.01);
}

#[test]
fn default_reference_pose_is_solstice_noon() {
    let raw = SolarAlmanac::new().angles_at(reference_instant()).unwrap();
    assert_near(raw.orbital, 270.0, 0.5);
    assert_near(effective_rotation(&raw), 0.0, 0.25);
    // Rotation motor rides the arm, so it reads hour angle minus longitude.
    assert_near(raw.rotation, 90.0, 0.6);
}

#[test]
fn rotation_carries_hour_angle_less_longitude() {
    let t = at(2025, 8, 14, 17, 20, 0);
    let raw = SolarAlmanac::new().angles_at(t).unwrap();
    let expect = greenwich_hour_angle(t).wrapping_sub(solar_longitude(t));
    assert_abs_diff_eq!(raw.rotation.degrees(), expect.degrees(), epsilon = 1e-9);
}

#[test]
fn out_of_range_years_are_unavailable() {
    let almanac = SolarAlmanac::new();
    let err = almanac.angles_at(at(2500, 1, 1, 0, 0, 0)).unwrap_err();
    assert!(matches!(err, ControlError::EphemerisUnavailable(_)));
    assert!(err.is_recoverable());
    assert!(almanac.angles_at(at(1799, 12, 31, 23, 59, 59)).is_err());
    assert!(almanac.angles_at(at(2200, 12, 31, 0, 0, 0)).is_ok());
}
