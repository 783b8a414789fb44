pub mod engine;
pub mod homing;
pub mod mapper;
pub mod planner;
pub mod state;
