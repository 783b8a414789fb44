// crates/orrery-cli/src/io/mod.rs

pub mod config_file;
pub mod instant;
