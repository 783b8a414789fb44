use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use orrery_core::clock::{Clock, ShutdownSignal};
use orrery_core::control::engine::AxisHardware;
use orrery_core::control::state::TrackingPhase;
use orrery_core::sim::{
    sim_axis, SharedMechanism, SimHallSensor, SimMechanism, SimStepper, SimulatedClock,
};
use orrery_core::{
    AngleSource, Axis, ControlError, ControllerConfig, RawAngles, Result, TrackingLoop,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Orbit advances 1°/h from 270, rotation 15°/h from 100.
/// `fail` marks instants at which the source is unavailable.
struct LinearSource {
    fail: Box<dyn Fn(DateTime<Utc>) -> bool>,
}

impl LinearSource {
    fn steady() -> Self {
        Self {
            fail: Box::new(|_| false),
        }
    }

    fn failing_when(f: impl Fn(DateTime<Utc>) -> bool + 'static) -> Self {
        Self { fail: Box::new(f) }
    }
}

impl AngleSource for LinearSource {
    fn angles_at(&self, t: DateTime<Utc>) -> Result<RawAngles> {
        if (self.fail)(t) {
            return Err(ControlError::EphemerisUnavailable("no data".into()));
        }
        let hours = (t - t0()).num_milliseconds() as f64 / 3_600_000.0;
        Ok(RawAngles::new(270.0 + hours, 100.0 + 15.0 * hours))
    }
}

fn minutes_after_start(t: DateTime<Utc>) -> i64 {
    (t - start()).num_minutes()
}

/// First tracking cycle: 40 h after the reference instant.
fn start() -> DateTime<Utc> {
    t0() + chrono::Duration::hours(40)
}

fn config() -> ControllerConfig {
    ControllerConfig {
        reference_instant: t0(),
        max_consecutive_faults: 3,
        ..ControllerConfig::default()
    }
}

type Loop<C> = TrackingLoop<LinearSource, C, SimStepper, SimHallSensor>;

struct Rig {
    orbital: SharedMechanism,
    rotation: SharedMechanism,
}

fn rig_with<C: Clock>(source: LinearSource, clock: C, cfg: ControllerConfig) -> (Rig, Loop<C>) {
    // Orbital homes backward from slot 30, rotation forward from slot 120;
    // both magnets sit at slot 0.
    let (om, ost, ohs) = sim_axis(SimMechanism::new(200).with_position(30));
    let (rm, rst, rhs) = sim_axis(SimMechanism::new(200).with_position(120));
    let lp = TrackingLoop::new(
        cfg,
        source,
        clock,
        AxisHardware::new(ost, ohs),
        AxisHardware::new(rst, rhs),
    )
    .unwrap();
    (
        Rig {
            orbital: om,
            rotation: rm,
        },
        lp,
    )
}

fn rig(source: LinearSource) -> (Rig, Loop<SimulatedClock>) {
    rig_with(source, SimulatedClock::starting_at(start()), config())
}

#[test]
fn runs_home_calibrate_track() {
    init_logs();
    let (rig, lp) = rig(LinearSource::steady());
    let mut lp = lp.with_max_cycles(Some(3));
    let report = lp.run().unwrap();

    assert_eq!(report.cycles, 3);
    assert_eq!(report.faulted_cycles, 0);
    assert_eq!(lp.phase(), TrackingPhase::Stopped);

    // Orbit 40° -> slot 22. Rotation 240° -> slot 133, reached the short way
    // (67 steps backward over two capped cycles).
    assert_eq!(report.orbital.relative_steps(), 22);
    assert_eq!(report.rotation.relative_steps(), -67);
    assert_eq!(report.orbital.zero_step_position, -30);
    assert_eq!(report.rotation.zero_step_position, 80);

    let o = rig.orbital.lock().unwrap();
    let r = rig.rotation.lock().unwrap();
    assert_eq!(o.position(), 22);
    assert_eq!(r.position(), 133);
    assert!(o.is_released());
    assert!(r.is_released());

    // Two full intervals slept; none after the last cycle.
    assert_eq!(lp.clock().now(), start() + chrono::Duration::minutes(2));
}

#[test]
fn reference_comes_from_reference_instant() {
    let (_rig, mut lp) = rig(LinearSource::steady());
    lp.home_all().unwrap();
    lp.calibrate().unwrap();
    let reference = lp.reference().unwrap();
    assert_eq!(reference.orbital.degrees(), 270.0);
    assert_eq!(reference.rotation.degrees(), 100.0);
    assert_eq!(lp.phase(), TrackingPhase::Tracking);
}

#[test]
fn cycle_reports_capped_moves() {
    let (_rig, mut lp) = rig(LinearSource::steady());
    lp.home_all().unwrap();
    lp.calibrate().unwrap();

    let first = lp.run_cycle().unwrap();
    assert!(!first.converged());
    let rot = first.moves.iter().find(|m| m.axis == Axis::Rotation).unwrap();
    assert_eq!(rot.delta, -50);

    let second = lp.run_cycle().unwrap();
    assert!(second.converged());
    let rot = second.moves.iter().find(|m| m.axis == Axis::Rotation).unwrap();
    assert_eq!(rot.delta, -17);

    let third = lp.run_cycle().unwrap();
    assert!(third.moves.iter().all(|m| m.delta == 0));
}

#[test]
fn calibration_requires_homing() {
    let (_rig, mut lp) = rig(LinearSource::steady());
    let err = lp.calibrate_with(RawAngles::new(270.0, 0.0)).unwrap_err();
    assert!(matches!(err, ControlError::NotHomed(Axis::Orbital)));
    assert!(lp.reference().is_none());
}

#[test]
fn tracking_requires_reference() {
    let (_rig, mut lp) = rig(LinearSource::steady());
    lp.home_all().unwrap();
    assert!(matches!(lp.track(), Err(ControlError::ReferenceNotSet)));
}

#[test]
fn second_calibration_is_rejected() {
    let (_rig, mut lp) = rig(LinearSource::steady());
    lp.home_all().unwrap();
    lp.calibrate_with(RawAngles::new(270.0, 100.0)).unwrap();
    let err = lp.calibrate_with(RawAngles::new(0.0, 0.0)).unwrap_err();
    assert!(matches!(err, ControlError::ReferenceAlreadySet));
    assert_eq!(lp.reference().unwrap().orbital.degrees(), 270.0);
}

#[test]
fn homing_failure_stops_before_tracking() {
    let (rig, mut lp) = rig(LinearSource::steady());
    rig.rotation.lock().unwrap().disconnect_sensor();

    let err = lp.run().unwrap_err();
    assert!(matches!(
        err,
        ControlError::SensorUnavailable {
            axis: Axis::Rotation,
            ..
        }
    ));
    assert_eq!(lp.phase(), TrackingPhase::Stopped);
    assert!(lp.axis_state(Axis::Orbital).homed);
    assert!(!lp.axis_state(Axis::Rotation).homed);
    assert!(lp.reference().is_none());
    assert_eq!(rig.rotation.lock().unwrap().pulses(), 0);
    assert!(rig.orbital.lock().unwrap().is_released());
}

#[test]
fn ephemeris_gap_skips_cycles_without_moving() {
    init_logs();
    // Unavailable on minutes 1, 2, 4 and 5: never three in a row.
    let source = LinearSource::failing_when(|t| matches!(minutes_after_start(t), 1 | 2 | 4 | 5));
    let (rig, lp) = rig(source);
    let mut lp = lp.with_max_cycles(Some(7));
    let report = lp.run().unwrap();

    assert_eq!(report.cycles, 7);
    assert_eq!(report.faulted_cycles, 4);
    // By minute 6 the rotation target has crossed into slot 134.
    assert_eq!(report.rotation.relative_steps(), -66);
    assert_eq!(rig.rotation.lock().unwrap().position(), 134);
}

#[test]
fn repeated_fault_escalates() {
    let source = LinearSource::failing_when(|t| t >= start());
    let (rig, mut lp) = rig(source);

    let err = lp.run().unwrap_err();
    match err {
        ControlError::FaultEscalated { kind, count, last } => {
            assert_eq!(kind, "ephemeris unavailable");
            assert_eq!(count, 3);
            assert!(matches!(*last, ControlError::EphemerisUnavailable(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
    let report = lp.report();
    assert_eq!(report.faulted_cycles, 3);
    assert_eq!(report.cycles, 2);
    assert!(rig.orbital.lock().unwrap().is_released());
    assert!(rig.rotation.lock().unwrap().is_released());
}

#[test]
fn stalled_axis_does_not_block_the_other() {
    let (rig, mut lp) = rig(LinearSource::steady());
    lp.home_all().unwrap();
    lp.calibrate().unwrap();
    rig.orbital.lock().unwrap().fail_after(10);

    let err = lp.run_cycle().unwrap_err();
    match err {
        ControlError::ActuatorFault {
            axis,
            completed,
            requested,
            ..
        } => {
            assert_eq!(axis, Axis::Orbital);
            assert_eq!(completed, 10);
            assert_eq!(requested, 22);
        }
        other => panic!("unexpected error: {other}"),
    }
    // Counter follows the pulses that completed.
    assert_eq!(lp.axis_state(Axis::Orbital).relative_steps(), 10);
    assert_eq!(rig.orbital.lock().unwrap().position(), 10);
    // Rotation still moved this cycle.
    assert_eq!(lp.axis_state(Axis::Rotation).relative_steps(), -50);

    // Once the driver recovers, the next cycle picks up the remainder.
    rig.orbital.lock().unwrap().clear_fault();
    lp.run_cycle().unwrap();
    assert_eq!(lp.axis_state(Axis::Orbital).relative_steps(), 22);
}

#[test]
fn stalled_axis_escalates_by_kind() {
    let (rig, mut lp) = rig(LinearSource::steady());
    lp.home_all().unwrap();
    lp.calibrate().unwrap();
    rig.orbital.lock().unwrap().fail_after(0);

    let err = lp.track().unwrap_err();
    assert!(matches!(
        err,
        ControlError::FaultEscalated { ref kind, count: 3, .. } if kind == "orbital actuator fault"
    ));
}

#[test]
fn shutdown_before_first_cycle() {
    let (rig, lp) = rig(LinearSource::steady());
    let stop = ShutdownSignal::new();
    stop.request();
    let mut lp = lp.with_shutdown(stop);
    let report = lp.run().unwrap();

    assert_eq!(report.cycles, 0);
    // Homing and calibration still complete; no tracking pulses follow.
    assert!(report.orbital.homed);
    assert_eq!(report.orbital.relative_steps(), 0);
    assert!(rig.orbital.lock().unwrap().is_released());
}

/// Requests shutdown the first time the loop sleeps.
struct InterruptingClock {
    inner: SimulatedClock,
    stop: ShutdownSignal,
}

impl Clock for InterruptingClock {
    fn now(&self) -> DateTime<Utc> {
        self.inner.now()
    }

    fn sleep(&mut self, d: Duration) {
        self.inner.sleep(d);
        self.stop.request();
    }
}

#[test]
fn shutdown_during_sleep_ends_at_cycle_boundary() {
    let stop = ShutdownSignal::new();
    let clock = InterruptingClock {
        inner: SimulatedClock::starting_at(start()),
        stop: stop.clone(),
    };
    let (rig, lp) = rig_with(LinearSource::steady(), clock, config());
    let mut lp = lp.with_shutdown(stop);
    let report = lp.run().unwrap();

    assert_eq!(report.cycles, 1);
    assert_eq!(report.orbital.relative_steps(), 22);
    assert_eq!(report.rotation.relative_steps(), -50);
    assert!(rig.rotation.lock().unwrap().is_released());
    // A single slice was slept before the request was seen.
    assert_eq!(
        lp.clock().now(),
        start() + chrono::Duration::milliseconds(250)
    );
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let cfg = ControllerConfig {
        interval_secs: 0,
        ..config()
    };
    let (_, ost, ohs) = sim_axis(SimMechanism::new(200));
    let (_, rst, rhs) = sim_axis(SimMechanism::new(200));
    let res = TrackingLoop::new(
        cfg,
        LinearSource::steady(),
        SimulatedClock::starting_at(start()),
        AxisHardware::new(ost, ohs),
        AxisHardware::new(rst, rhs),
    );
    assert!(matches!(res, Err(ControlError::Validation(_))));
}
