// crates/orrery-core/src/axis/sensor.rs

use crate::axis::state::Axis;
use crate::error::{ControlError, DriverFault, Result};

/// GPIO-side collaborator: one binary proximity line, already debounced.
pub trait SensorDriver {
    fn read(&mut self) -> std::result::Result<bool, DriverFault>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SensorState {
    Triggered,
    Clear,
}

impl SensorState {
    #[inline]
    pub fn is_triggered(self) -> bool {
        self == SensorState::Triggered
    }
}

/// Hall-effect (or similar) home sensor for one axis.
pub struct AxisSensor<S> {
    axis: Axis,
    driver: S,
}

impl<S: SensorDriver> AxisSensor<S> {
    pub fn new(axis: Axis, driver: S) -> Self {
        Self { axis, driver }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// A driver failure is never reported as `Clear`: a blind homing search
    /// would keep stepping forever.
    pub fn poll(&mut self) -> Result<SensorState> {
        match self.driver.read() {
            Ok(true) => Ok(SensorState::Triggered),
            Ok(false) => Ok(SensorState::Clear),
            Err(reason) => Err(ControlError::SensorUnavailable {
                axis: self.axis,
                reason,
            }),
        }
    }

    pub fn driver(&self) -> &S {
        &self.driver
    }
}
