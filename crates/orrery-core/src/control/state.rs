// crates/orrery-core/src/control/state.rs

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HomingState {
    Idle,
    Seeking,
    /// Terminal for the process lifetime.
    Homed,
    Failed,
}

/// Sub-steps of a homing run, named in logs and budget errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HomingPhase {
    /// Stepping off a magnet that already sits over the sensor.
    BackOff,
    /// Stepping until the sensor first triggers.
    Seek,
    /// Stepping across the magnet to measure its width.
    Traverse,
    /// Stepping back half the measured width.
    Center,
}

impl HomingPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            HomingPhase::BackOff => "backing off sensor",
            HomingPhase::Seek => "seeking sensor",
            HomingPhase::Traverse => "traversing magnet",
            HomingPhase::Center => "centering on magnet",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackingPhase {
    Initializing,
    Homing,
    Calibrating,
    Tracking,
    Stopped,
}
