// crates/orrery-core/src/config/config.rs

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::axis::state::{Axis, Direction};
use crate::config::defaults;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HomingStrategy {
    /// Zero is the first step at which the sensor reads triggered.
    FirstEdge,
    /// Zero is the middle of the magnet: back off, seek, traverse, return half.
    Centered,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisConfig {
    #[serde(default = "defaults::steps_per_revolution")]
    pub steps_per_revolution: u32,

    /// Search direction while seeking the home sensor.
    #[serde(default = "defaults::homing_direction")]
    pub homing_direction: Direction,

    #[serde(default = "defaults::homing_strategy")]
    pub homing_strategy: HomingStrategy,

    /// Maximum steps taken while seeking the sensor before giving up.
    #[serde(default = "defaults::homing_budget")]
    pub homing_budget: u32,

    /// Maximum steps spent crossing the magnet (centered homing only).
    #[serde(default = "defaults::sensor_width_budget")]
    pub sensor_width_budget: u32,

    /// Cap on |delta| issued in one tracking cycle.
    #[serde(default = "defaults::max_steps_per_cycle")]
    pub max_steps_per_cycle: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Wall-clock period of one tracking cycle.
    #[serde(default = "defaults::interval_secs")]
    pub interval_secs: u64,

    /// The same recoverable fault on this many consecutive cycles is fatal.
    #[serde(default = "defaults::max_consecutive_faults")]
    pub max_consecutive_faults: u32,

    /// Instant whose almanac angles define the mechanical zero of both axes.
    #[serde(default = "defaults::reference_instant")]
    pub reference_instant: DateTime<Utc>,

    #[serde(default = "defaults::orbital_axis")]
    pub orbital: AxisConfig,

    #[serde(default = "defaults::rotation_axis")]
    pub rotation: AxisConfig,
}

impl ControllerConfig {
    pub fn axis(&self, axis: Axis) -> &AxisConfig {
        match axis {
            Axis::Orbital => &self.orbital,
            Axis::Rotation => &self.rotation,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        defaults::default_config()
    }
}
