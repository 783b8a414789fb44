// crates/orrery-core/src/config/defaults.rs

use chrono::{DateTime, TimeZone, Utc};

use crate::axis::state::Direction;
use crate::config::config::{AxisConfig, ControllerConfig, HomingStrategy};

pub const STEPS_PER_REVOLUTION: u32 = 200;

pub fn steps_per_revolution() -> u32 {
    STEPS_PER_REVOLUTION
}

pub fn homing_direction() -> Direction {
    Direction::Forward
}

pub fn homing_strategy() -> HomingStrategy {
    HomingStrategy::FirstEdge
}

/// One revolution plus 5%: the magnet must pass the sensor within a turn.
pub fn homing_budget() -> u32 {
    STEPS_PER_REVOLUTION + STEPS_PER_REVOLUTION / 20
}

pub fn sensor_width_budget() -> u32 {
    50
}

pub fn max_steps_per_cycle() -> u32 {
    50
}

pub fn interval_secs() -> u64 {
    60
}

pub fn max_consecutive_faults() -> u32 {
    5
}

/// Greenwich apparent solar noon on the December 2023 solstice day
/// (solstice at 03:27 UTC, equation of time about +1.6 min).
pub fn reference_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 12, 22, 11, 58, 26)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

pub fn orbital_axis() -> AxisConfig {
    AxisConfig {
        homing_direction: Direction::Backward,
        ..axis_config()
    }
}

pub fn rotation_axis() -> AxisConfig {
    AxisConfig {
        homing_direction: Direction::Forward,
        ..axis_config()
    }
}

fn axis_config() -> AxisConfig {
    AxisConfig {
        steps_per_revolution: steps_per_revolution(),
        homing_direction: homing_direction(),
        homing_strategy: homing_strategy(),
        homing_budget: homing_budget(),
        sensor_width_budget: sensor_width_budget(),
        max_steps_per_cycle: max_steps_per_cycle(),
    }
}

pub fn default_config() -> ControllerConfig {
    ControllerConfig {
        interval_secs: interval_secs(),
        max_consecutive_faults: max_consecutive_faults(),
        reference_instant: reference_instant(),
        orbital: orbital_axis(),
        rotation: rotation_axis(),
    }
}
