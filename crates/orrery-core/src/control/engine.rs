// crates/orrery-core/src/control/engine.rs

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};

use crate::angle::Angle;
use crate::axis::actuator::{Actuator, StepperDriver};
use crate::axis::sensor::{AxisSensor, SensorDriver};
use crate::axis::state::{Axis, AxisState};
use crate::clock::{sleep_until_next_cycle, Clock, ShutdownSignal};
use crate::config::config::{AxisConfig, ControllerConfig};
use crate::control::homing::{HomingController, HomingReport};
use crate::control::mapper::{AngleMapper, ReferencePose};
use crate::control::planner::MotionPlanner;
use crate::control::state::TrackingPhase;
use crate::ephemeris::{AngleSource, RawAngles};
use crate::error::{ControlError, Result};
use crate::validate::validate_config;

/// Driver pair for one axis, handed to the loop at construction.
pub struct AxisHardware<D, S> {
    pub stepper: D,
    pub sensor: S,
}

impl<D, S> AxisHardware<D, S> {
    pub fn new(stepper: D, sensor: S) -> Self {
        Self { stepper, sensor }
    }
}

/// Everything one axis owns. Nothing here is shared with the other axis.
pub struct AxisUnit<D, S> {
    pub state: AxisState,
    pub actuator: Actuator<D>,
    pub sensor: AxisSensor<S>,
    pub homing: HomingController,
    pub planner: MotionPlanner,
}

impl<D: StepperDriver, S: SensorDriver> AxisUnit<D, S> {
    pub fn new(axis: Axis, cfg: &AxisConfig, hw: AxisHardware<D, S>) -> Self {
        Self {
            state: AxisState::new(axis, cfg.steps_per_revolution),
            actuator: Actuator::new(axis, hw.stepper),
            sensor: AxisSensor::new(axis, hw.sensor),
            homing: HomingController::new(axis, cfg),
            planner: MotionPlanner::new(cfg.max_steps_per_cycle),
        }
    }

    pub fn home(&mut self) -> Result<HomingReport> {
        self.homing
            .home(&mut self.state, &mut self.actuator, &mut self.sensor)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisMove {
    pub axis: Axis,
    pub target_angle: Angle,
    pub target_step_count: i64,
    /// Steps actually issued this cycle (after the per-cycle cap).
    pub delta: i64,
    pub position: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CycleOutcome {
    pub at: DateTime<Utc>,
    pub raw: RawAngles,
    pub moves: Vec<AxisMove>,
}

impl CycleOutcome {
    /// True once every axis sits on its target slot.
    pub fn converged(&self) -> bool {
        self.moves
            .iter()
            .all(|m| m.position == m.target_step_count)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunReport {
    pub cycles: u64,
    pub faulted_cycles: u64,
    pub orbital: AxisState,
    pub rotation: AxisState,
}

#[derive(Clone, Debug, Default)]
struct FaultStreak {
    kind: Option<String>,
    count: u32,
}

impl FaultStreak {
    fn observe(&mut self, e: &ControlError) -> u32 {
        let kind = e.fault_kind();
        if self.kind.as_deref() == Some(kind.as_str()) {
            self.count += 1;
        } else {
            self.kind = Some(kind);
            self.count = 1;
        }
        self.count
    }

    fn reset(&mut self) {
        self.kind = None;
        self.count = 0;
    }
}

/// Top-level controller: Initializing -> Homing -> Calibrating -> Tracking.
pub struct TrackingLoop<E, C, D, S> {
    config: ControllerConfig,
    source: E,
    clock: C,
    shutdown: ShutdownSignal,
    max_cycles: Option<u64>,
    orbital: AxisUnit<D, S>,
    rotation: AxisUnit<D, S>,
    mapper: AngleMapper,
    phase: TrackingPhase,
    streak: FaultStreak,
    cycles: u64,
    faulted_cycles: u64,
}

impl<E, C, D, S> TrackingLoop<E, C, D, S>
where
    E: AngleSource,
    C: Clock,
    D: StepperDriver,
    S: SensorDriver,
{
    pub fn new(
        config: ControllerConfig,
        source: E,
        clock: C,
        orbital: AxisHardware<D, S>,
        rotation: AxisHardware<D, S>,
    ) -> Result<Self> {
        validate_config(&config)?;
        let orbital = AxisUnit::new(Axis::Orbital, &config.orbital, orbital);
        let rotation = AxisUnit::new(Axis::Rotation, &config.rotation, rotation);
        Ok(Self {
            config,
            source,
            clock,
            shutdown: ShutdownSignal::new(),
            max_cycles: None,
            orbital,
            rotation,
            mapper: AngleMapper::new(),
            phase: TrackingPhase::Initializing,
            streak: FaultStreak::default(),
            cycles: 0,
            faulted_cycles: 0,
        })
    }

    pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Stop tracking after `n` cycles instead of running until shutdown.
    pub fn with_max_cycles(mut self, n: Option<u64>) -> Self {
        self.max_cycles = n;
        self
    }

    pub fn phase(&self) -> TrackingPhase {
        self.phase
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    pub fn reference(&self) -> Option<ReferencePose> {
        self.mapper.reference()
    }

    pub fn mapper(&self) -> &AngleMapper {
        &self.mapper
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn axis_state(&self, axis: Axis) -> &AxisState {
        &self.unit(axis).state
    }

    pub fn unit(&self, axis: Axis) -> &AxisUnit<D, S> {
        match axis {
            Axis::Orbital => &self.orbital,
            Axis::Rotation => &self.rotation,
        }
    }

    pub fn report(&self) -> RunReport {
        RunReport {
            cycles: self.cycles,
            faulted_cycles: self.faulted_cycles,
            orbital: self.orbital.state,
            rotation: self.rotation.state,
        }
    }

    /// Home, calibrate, then track until shutdown (or the cycle limit).
    /// Coils are released on every exit path.
    pub fn run(&mut self) -> Result<RunReport> {
        let result = self.run_phases();
        self.phase = TrackingPhase::Stopped;
        self.orbital.actuator.release();
        self.rotation.actuator.release();
        match result {
            Ok(()) => {
                info!(
                    "stopped after {} cycles ({} faulted)",
                    self.cycles, self.faulted_cycles
                );
                Ok(self.report())
            }
            Err(e) => {
                error!("controller stopped: {e}");
                Err(e)
            }
        }
    }

    fn run_phases(&mut self) -> Result<()> {
        self.home_all()?;
        self.calibrate()?;
        self.track()
    }

    /// Home both axes, orbital first. Either failure is fatal.
    pub fn home_all(&mut self) -> Result<[HomingReport; 2]> {
        self.phase = TrackingPhase::Homing;
        let orbital = self.orbital.home()?;
        let rotation = self.rotation.home()?;
        Ok([orbital, rotation])
    }

    /// Sample the almanac at the configured reference instant and adopt it as
    /// the reference pose.
    pub fn calibrate(&mut self) -> Result<()> {
        self.phase = TrackingPhase::Calibrating;
        self.require_homed()?;
        let at = self.config.reference_instant;
        let raw = self.source.angles_at(at)?;
        info!("reference instant {}", at.to_rfc3339());
        self.calibrate_with(raw)
    }

    /// Adopt `raw` as the reference pose. Both axes must already be homed.
    pub fn calibrate_with(&mut self, raw: RawAngles) -> Result<()> {
        self.phase = TrackingPhase::Calibrating;
        self.require_homed()?;
        self.mapper.initialize_reference(raw)?;
        info!(
            "reference pose orbital={} rotation={}",
            raw.orbital, raw.rotation
        );
        self.phase = TrackingPhase::Tracking;
        Ok(())
    }

    fn require_homed(&self) -> Result<()> {
        for axis in Axis::ALL {
            if !self.axis_state(axis).homed {
                return Err(ControlError::NotHomed(axis));
            }
        }
        Ok(())
    }

    /// Cycle until shutdown or the cycle limit. Recoverable faults are retried
    /// on the next cycle; the same one on `max_consecutive_faults` cycles in a
    /// row is fatal.
    pub fn track(&mut self) -> Result<()> {
        if self.mapper.reference().is_none() {
            return Err(ControlError::ReferenceNotSet);
        }
        self.phase = TrackingPhase::Tracking;
        let interval = self.config.interval();

        loop {
            if self.shutdown.is_requested() {
                info!("shutdown requested");
                return Ok(());
            }
            if self.cycle_limit_reached() {
                return Ok(());
            }

            match self.run_cycle() {
                Ok(outcome) => {
                    self.streak.reset();
                    debug!(
                        "cycle {} at {}: converged={}",
                        self.cycles,
                        outcome.at.to_rfc3339(),
                        outcome.converged()
                    );
                }
                Err(e) if e.is_recoverable() => {
                    self.faulted_cycles += 1;
                    let count = self.streak.observe(&e);
                    warn!(
                        "cycle {} failed ({count}/{}): {e}",
                        self.cycles, self.config.max_consecutive_faults
                    );
                    if count >= self.config.max_consecutive_faults {
                        return Err(ControlError::FaultEscalated {
                            kind: e.fault_kind(),
                            count,
                            last: Box::new(e),
                        });
                    }
                }
                Err(e) => return Err(e),
            }
            self.cycles += 1;

            if self.cycle_limit_reached() {
                return Ok(());
            }
            if !sleep_until_next_cycle(&mut self.clock, interval, &self.shutdown) {
                info!("shutdown requested");
                return Ok(());
            }
        }
    }

    fn cycle_limit_reached(&self) -> bool {
        self.max_cycles.is_some_and(|max| self.cycles >= max)
    }

    /// One pass: almanac at `now`, then map, plan and step each axis.
    ///
    /// Both axes are attempted even if the first one faults; the first error
    /// is returned.
    pub fn run_cycle(&mut self) -> Result<CycleOutcome> {
        let at = self.clock.now();
        let raw = self.source.angles_at(at)?;
        debug!("raw angles orbital={} rotation={}", raw.orbital, raw.rotation);

        let mut moves = Vec::with_capacity(2);
        let mut first_err = None;
        for axis in Axis::ALL {
            match self.track_axis(axis, &raw) {
                Ok(m) => moves.push(m),
                Err(e) => {
                    warn!("{axis}: {e}");
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                }
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(CycleOutcome { at, raw, moves }),
        }
    }

    fn track_axis(&mut self, axis: Axis, raw: &RawAngles) -> Result<AxisMove> {
        let target_angle = self.mapper.target_angle(raw, axis)?;
        let unit = match axis {
            Axis::Orbital => &mut self.orbital,
            Axis::Rotation => &mut self.rotation,
        };
        let target_step_count = self.mapper.target_step_count(&unit.state, target_angle)?;
        let delta = unit.planner.plan_move(&unit.state, target_step_count);

        if delta != 0 {
            info!(
                "{axis}[degrees={:.4}, target={}, position={}, delta={:+}]",
                target_angle.degrees(),
                target_step_count,
                unit.state.current_step_position,
                delta
            );
        }
        unit.actuator.step(&mut unit.state, delta)?;

        Ok(AxisMove {
            axis,
            target_angle,
            target_step_count,
            delta,
            position: unit.state.current_step_position,
        })
    }
}
