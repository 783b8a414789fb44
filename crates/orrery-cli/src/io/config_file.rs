// crates/orrery-cli/src/io/config_file.rs

use anyhow::{Context, Result};
use orrery_core::config::format as config_format;
use orrery_core::ControllerConfig;

/// Load and validate a TOML controller config.
pub fn load_config(path: &str) -> Result<ControllerConfig> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read config {path}"))?;
    let cfg = config_format::decode(&text).with_context(|| format!("decode config {path}"))?;
    Ok(cfg)
}

/// Built-in defaults when no path is given.
pub fn load_or_default(path: Option<&str>) -> Result<ControllerConfig> {
    match path {
        Some(p) => load_config(p),
        None => Ok(ControllerConfig::default()),
    }
}

pub fn save_config(path: &str, cfg: &ControllerConfig) -> Result<()> {
    let text = config_format::encode(cfg).context("encode config")?;
    std::fs::write(path, text).with_context(|| format!("write config {path}"))?;
    Ok(())
}
