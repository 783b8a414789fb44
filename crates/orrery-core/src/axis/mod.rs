pub mod actuator;
pub mod sensor;
pub mod state;
