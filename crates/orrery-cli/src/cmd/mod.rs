// crates/orrery-cli/src/cmd/mod.rs

pub mod angles;
pub mod config;
pub mod plan;
pub mod run;
