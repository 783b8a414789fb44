use approx::assert_abs_diff_eq;
use orrery_core::control::mapper::{angle_to_slot, slot_to_angle};
use orrery_core::{normalize, Angle};

#[test]
fn normalize_stays_in_range() {
    let samples = [
        -1e9, -720.5, -360.0, -0.25, -1e-20, 0.0, 1e-12, 90.0, 359.999_999, 360.0, 725.0, 1e9,
    ];
    for a in samples {
        let n = normalize(a);
        assert!((0.0..360.0).contains(&n), "normalize({a}) = {n}");
    }
}

#[test]
fn normalize_is_periodic() {
    for i in -50..50 {
        let a = i as f64 * 17.3 + 0.125;
        assert_abs_diff_eq!(normalize(a), normalize(a + 360.0), epsilon = 1e-9);
        assert_abs_diff_eq!(normalize(a), normalize(a - 720.0), epsilon = 1e-9);
    }
}

#[test]
fn tiny_negative_wraps_to_zero_not_360() {
    assert_eq!(normalize(-1e-20), 0.0);
    assert_eq!(Angle::from_degrees(-1e-20).degrees(), 0.0);
}

#[test]
fn subtraction_wraps() {
    let d = Angle::from_degrees(10.0).wrapping_sub(Angle::from_degrees(270.0));
    assert_abs_diff_eq!(d.degrees(), 100.0, epsilon = 1e-12);
}

#[test]
fn distance_takes_short_way_round() {
    let a = Angle::from_degrees(359.0);
    let b = Angle::from_degrees(1.0);
    assert_abs_diff_eq!(a.distance(b), 2.0, epsilon = 1e-9);
    assert_abs_diff_eq!(b.distance(a), 2.0, epsilon = 1e-9);
    assert_abs_diff_eq!(
        Angle::from_degrees(0.0).distance(Angle::from_degrees(180.0)),
        180.0,
        epsilon = 1e-12
    );
}

#[test]
fn slots_floor_and_wrap() {
    assert_eq!(angle_to_slot(Angle::from_degrees(0.0), 200), 0);
    assert_eq!(angle_to_slot(Angle::from_degrees(1.79), 200), 0);
    assert_eq!(angle_to_slot(Angle::from_degrees(9.0), 200), 5);
    assert_eq!(angle_to_slot(Angle::from_degrees(90.0), 200), 50);
    assert_eq!(angle_to_slot(Angle::from_degrees(100.0), 200), 55);
    assert_eq!(angle_to_slot(Angle::from_degrees(359.9), 200), 199);
    assert_eq!(angle_to_slot(Angle::from_degrees(359.999_999_999_9), 200), 0);
}

#[test]
fn slot_angle_inverse() {
    for slot in 0..200 {
        let a = slot_to_angle(slot, 200);
        assert_eq!(angle_to_slot(a, 200), slot, "slot {slot} -> {a}");
    }
}
