// crates/orrery-core/src/control/homing.rs

use log::{debug, error, info};

use crate::axis::actuator::{Actuator, StepperDriver};
use crate::axis::sensor::{AxisSensor, SensorDriver, SensorState};
use crate::axis::state::{Axis, AxisState, Direction};
use crate::config::config::{AxisConfig, HomingStrategy};
use crate::control::state::{HomingPhase, HomingState};
use crate::error::{ControlError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct HomingReport {
    /// Steps taken before the sensor first triggered.
    pub seek_steps: u32,
    /// All steps issued during homing, every phase included.
    pub total_steps: u32,
    /// Measured magnet width in steps (centered homing only).
    pub magnet_width: Option<u32>,
    pub zero_step_position: i64,
}

/// Per-axis homing state machine: Idle -> Seeking -> Homed.
#[derive(Clone, Debug)]
pub struct HomingController {
    axis: Axis,
    direction: Direction,
    strategy: HomingStrategy,
    budget: u32,
    width_budget: u32,
    state: HomingState,
}

impl HomingController {
    pub fn new(axis: Axis, cfg: &AxisConfig) -> Self {
        Self {
            axis,
            direction: cfg.homing_direction,
            strategy: cfg.homing_strategy,
            budget: cfg.homing_budget,
            width_budget: cfg.sensor_width_budget,
            state: HomingState::Idle,
        }
    }

    pub fn state(&self) -> HomingState {
        self.state
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }

    /// Drive the axis until the sensor defines its zero.
    ///
    /// Any failure is fatal for the axis and leaves it un-homed: a stepper
    /// searching without a working sensor can wind cables or strip gears.
    pub fn home<D: StepperDriver, S: SensorDriver>(
        &mut self,
        st: &mut AxisState,
        actuator: &mut Actuator<D>,
        sensor: &mut AxisSensor<S>,
    ) -> Result<HomingReport> {
        if self.state == HomingState::Homed && st.homed {
            return Ok(HomingReport {
                zero_step_position: st.zero_step_position,
                ..HomingReport::default()
            });
        }

        self.state = HomingState::Seeking;
        info!(
            "{}: homing ({:?}, {:?}, budget {} steps)",
            self.axis, self.strategy, self.direction, self.budget
        );

        let outcome = match self.strategy {
            HomingStrategy::FirstEdge => self.home_first_edge(st, actuator, sensor),
            HomingStrategy::Centered => self.home_centered(st, actuator, sensor),
        };

        match outcome {
            Ok(mut report) => {
                st.mark_homed();
                report.zero_step_position = st.zero_step_position;
                self.state = HomingState::Homed;
                info!(
                    "{}: homed at step {} after {} steps",
                    self.axis, st.zero_step_position, report.total_steps
                );
                Ok(report)
            }
            Err(e) => {
                self.state = HomingState::Failed;
                error!("{}: homing failed: {e}", self.axis);
                Err(e)
            }
        }
    }

    fn home_first_edge<D: StepperDriver, S: SensorDriver>(
        &self,
        st: &mut AxisState,
        actuator: &mut Actuator<D>,
        sensor: &mut AxisSensor<S>,
    ) -> Result<HomingReport> {
        let seek = self.step_while(
            st,
            actuator,
            sensor,
            SensorState::Clear,
            self.direction,
            self.budget,
            HomingPhase::Seek,
        )?;
        Ok(HomingReport {
            seek_steps: seek,
            total_steps: seek,
            ..HomingReport::default()
        })
    }

    fn home_centered<D: StepperDriver, S: SensorDriver>(
        &self,
        st: &mut AxisState,
        actuator: &mut Actuator<D>,
        sensor: &mut AxisSensor<S>,
    ) -> Result<HomingReport> {
        let back = self.step_while(
            st,
            actuator,
            sensor,
            SensorState::Triggered,
            self.direction.reversed(),
            self.width_budget,
            HomingPhase::BackOff,
        )?;
        let seek = self.step_while(
            st,
            actuator,
            sensor,
            SensorState::Clear,
            self.direction,
            self.budget,
            HomingPhase::Seek,
        )?;
        let width = self.step_while(
            st,
            actuator,
            sensor,
            SensorState::Triggered,
            self.direction,
            self.width_budget,
            HomingPhase::Traverse,
        )?;

        let half = width / 2;
        debug!(
            "{}: {} ({} steps back)",
            self.axis,
            HomingPhase::Center.as_str(),
            half
        );
        actuator.step(st, -self.direction.sign() * i64::from(half))?;

        Ok(HomingReport {
            seek_steps: seek,
            total_steps: back + seek + width + half,
            magnet_width: Some(width),
            zero_step_position: 0,
        })
    }

    /// Poll, then step once, for as long as the sensor reads `while_state`.
    /// Never issues more than `budget` steps.
    #[allow(clippy::too_many_arguments)]
    fn step_while<D: StepperDriver, S: SensorDriver>(
        &self,
        st: &mut AxisState,
        actuator: &mut Actuator<D>,
        sensor: &mut AxisSensor<S>,
        while_state: SensorState,
        dir: Direction,
        budget: u32,
        phase: HomingPhase,
    ) -> Result<u32> {
        let mut taken = 0u32;
        loop {
            if sensor.poll()? != while_state {
                debug!("{}: {} done in {} steps", self.axis, phase.as_str(), taken);
                return Ok(taken);
            }
            if taken >= budget {
                return Err(ControlError::HomingBudgetExceeded {
                    axis: self.axis,
                    phase: phase.as_str(),
                    budget,
                });
            }
            actuator.step(st, dir.sign())?;
            taken += 1;
        }
    }
}
