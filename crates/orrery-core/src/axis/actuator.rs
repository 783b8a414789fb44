// crates/orrery-core/src/axis/actuator.rs

use log::warn;

use crate::axis::state::{Axis, AxisState, Direction};
use crate::error::{ControlError, DriverFault, Result};

/// Motor-controller collaborator. `step_once` returns only after the
/// mechanical step completed, or with the fault that prevented it.
pub trait StepperDriver {
    fn step_once(&mut self, dir: Direction) -> std::result::Result<(), DriverFault>;

    /// De-energize the coils.
    fn release(&mut self) -> std::result::Result<(), DriverFault>;
}

pub struct Actuator<D> {
    axis: Axis,
    driver: D,
    pulses_issued: u64,
}

impl<D: StepperDriver> Actuator<D> {
    pub fn new(axis: Axis, driver: D) -> Self {
        Self {
            axis,
            driver,
            pulses_issued: 0,
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Total pulses that completed over the actuator's lifetime.
    pub fn pulses_issued(&self) -> u64 {
        self.pulses_issued
    }

    /// Issue `|delta|` pulses in the sign's direction.
    ///
    /// The counter is committed once, after the pulse train. On a driver fault
    /// it advances by exactly the pulses that completed, so it never disagrees
    /// with the mechanism.
    pub fn step(&mut self, state: &mut AxisState, delta: i64) -> Result<()> {
        if delta == 0 {
            return Ok(());
        }
        let dir = Direction::of_delta(delta);
        let requested = delta.unsigned_abs();
        let mut completed: u64 = 0;

        let outcome = loop {
            if completed == requested {
                break Ok(());
            }
            match self.driver.step_once(dir) {
                Ok(()) => completed += 1,
                Err(reason) => break Err(reason),
            }
        };

        state.current_step_position += dir.sign() * completed as i64;
        self.pulses_issued += completed;

        outcome.map_err(|reason| ControlError::ActuatorFault {
            axis: self.axis,
            completed: completed as u32,
            requested: requested as u32,
            reason,
        })
    }

    pub fn release(&mut self) {
        if let Err(e) = self.driver.release() {
            warn!("{} actuator release failed: {e}", self.axis);
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }
}
