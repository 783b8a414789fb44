use thiserror::Error;

use crate::axis::state::Axis;

pub type Result<T> = std::result::Result<T, ControlError>;

/// Failure reported by a hardware driver (stepper or sensor collaborator).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct DriverFault(pub String);

impl DriverFault {
    pub fn new(msg: impl Into<String>) -> Self {
        DriverFault(msg.into())
    }
}

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("{axis} sensor unavailable: {reason}")]
    SensorUnavailable { axis: Axis, reason: DriverFault },

    #[error("{axis} homing exceeded budget of {budget} steps while {phase}")]
    HomingBudgetExceeded {
        axis: Axis,
        phase: &'static str,
        budget: u32,
    },

    #[error("{axis} actuator fault after {completed}/{requested} pulses: {reason}")]
    ActuatorFault {
        axis: Axis,
        completed: u32,
        requested: u32,
        reason: DriverFault,
    },

    #[error("ephemeris unavailable: {0}")]
    EphemerisUnavailable(String),

    #[error("{0} axis is not homed")]
    NotHomed(Axis),

    #[error("reference pose has not been initialized")]
    ReferenceNotSet,

    #[error("reference pose is already initialized")]
    ReferenceAlreadySet,

    #[error("{kind} repeated for {count} consecutive cycles; last: {last}")]
    FaultEscalated {
        kind: String,
        count: u32,
        last: Box<ControlError>,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("config format error: {0}")]
    ConfigFormat(String),
}

impl ControlError {
    /// Errors the tracking loop retries on the next cycle instead of aborting.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ControlError::ActuatorFault { .. } | ControlError::EphemerisUnavailable(_)
        )
    }

    /// Short label used to detect the same fault repeating across cycles.
    pub fn fault_kind(&self) -> String {
        match self {
            ControlError::SensorUnavailable { axis, .. } => format!("{axis} sensor unavailable"),
            ControlError::HomingBudgetExceeded { axis, .. } => format!("{axis} homing budget"),
            ControlError::ActuatorFault { axis, .. } => format!("{axis} actuator fault"),
            ControlError::EphemerisUnavailable(_) => "ephemeris unavailable".into(),
            ControlError::NotHomed(axis) => format!("{axis} not homed"),
            ControlError::ReferenceNotSet => "reference not set".into(),
            ControlError::ReferenceAlreadySet => "reference already set".into(),
            ControlError::FaultEscalated { kind, .. } => kind.clone(),
            ControlError::Validation(_) => "validation".into(),
            ControlError::ConfigFormat(_) => "config format".into(),
        }
    }
}
