use crate::axis::state::Axis;
use crate::config::config::{ControllerConfig, HomingStrategy};
use crate::error::{ControlError, Result};

pub fn validate_config(c: &ControllerConfig) -> Result<()> {
    if c.interval_secs == 0 {
        return Err(ControlError::Validation(
            "interval_secs must be non-zero".into(),
        ));
    }
    // Zero would escalate the first transient fault.
    if c.max_consecutive_faults == 0 {
        return Err(ControlError::Validation(
            "max_consecutive_faults must be non-zero".into(),
        ));
    }

    for axis in Axis::ALL {
        let a = c.axis(axis);
        if a.steps_per_revolution < 2 {
            return Err(ControlError::Validation(format!(
                "{axis}.steps_per_revolution must be at least 2"
            )));
        }
        // The sensor cannot be found without stepping.
        if a.homing_budget == 0 {
            return Err(ControlError::Validation(format!(
                "{axis}.homing_budget must be non-zero"
            )));
        }
        if a.max_steps_per_cycle == 0 {
            return Err(ControlError::Validation(format!(
                "{axis}.max_steps_per_cycle must be non-zero"
            )));
        }
        match a.homing_strategy {
            HomingStrategy::FirstEdge => {}
            HomingStrategy::Centered => {
                if a.sensor_width_budget == 0 {
                    return Err(ControlError::Validation(format!(
                        "{axis}.sensor_width_budget must be non-zero for centered homing"
                    )));
                }
            }
        }
    }

    Ok(())
}
