// crates/orrery-core/src/axis/state.rs

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Lower motor: placement of the earth around the sun.
    Orbital,
    /// Upper motor: spin of the earth about its polar axis.
    Rotation,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::Orbital, Axis::Rotation];
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Orbital => f.write_str("orbital"),
            Axis::Rotation => f.write_str("rotation"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }

    #[inline]
    pub fn reversed(self) -> Direction {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }

    #[inline]
    pub fn of_delta(delta: i64) -> Direction {
        if delta < 0 {
            Direction::Backward
        } else {
            Direction::Forward
        }
    }
}

/// Step bookkeeping for one axis.
///
/// `current_step_position` is the raw, unbounded step counter since process
/// start. After homing, `zero_step_position` holds the counter value at the
/// sensor-verified origin; only then does `current - zero` carry an angle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxisState {
    pub axis: Axis,
    pub homed: bool,
    pub zero_step_position: i64,
    pub current_step_position: i64,
    pub steps_per_revolution: u32,
}

impl AxisState {
    pub fn new(axis: Axis, steps_per_revolution: u32) -> Self {
        Self {
            axis,
            homed: false,
            zero_step_position: 0,
            current_step_position: 0,
            steps_per_revolution,
        }
    }

    /// Steps from the homed origin (meaningless before homing).
    #[inline]
    pub fn relative_steps(&self) -> i64 {
        self.current_step_position - self.zero_step_position
    }

    /// Position within the current revolution, in [0, steps_per_revolution).
    #[inline]
    pub fn slot(&self) -> i64 {
        self.relative_steps()
            .rem_euclid(i64::from(self.steps_per_revolution))
    }

    #[inline]
    pub fn degrees_per_step(&self) -> f64 {
        360.0 / f64::from(self.steps_per_revolution)
    }

    pub(crate) fn mark_homed(&mut self) {
        self.zero_step_position = self.current_step_position;
        self.homed = true;
    }
}
