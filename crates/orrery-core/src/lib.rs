pub mod error;
pub mod validate;

pub mod angle;
pub mod axis;
pub mod clock;
pub mod config;
pub mod control;
pub mod ephemeris;
pub mod sim;

pub use crate::angle::{normalize, Angle};
pub use crate::axis::state::{Axis, AxisState, Direction};
pub use crate::config::config::ControllerConfig;
pub use crate::control::engine::TrackingLoop;
pub use crate::ephemeris::{AngleSource, RawAngles};
pub use crate::error::{ControlError, DriverFault, Result};
