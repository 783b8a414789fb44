// crates/orrery-core/src/config/format.rs

use crate::config::config::ControllerConfig;
use crate::error::{ControlError, Result};
use crate::validate::validate_config;

/// Parse and validate a TOML controller config. Missing keys take defaults.
pub fn decode(text: &str) -> Result<ControllerConfig> {
    let cfg: ControllerConfig =
        toml::from_str(text).map_err(|e| ControlError::ConfigFormat(e.to_string()))?;
    validate_config(&cfg)?;
    Ok(cfg)
}

/// Canonical TOML rendering (every key written, fixed order).
pub fn encode(cfg: &ControllerConfig) -> Result<String> {
    toml::to_string(cfg).map_err(|e| ControlError::ConfigFormat(e.to_string()))
}

/// Stable config identifier: blake3 over the canonical TOML, truncated to 16 bytes.
pub fn config_id_16(cfg: &ControllerConfig) -> Result<[u8; 16]> {
    let text = encode(cfg)?;
    let hash = blake3::hash(text.as_bytes());
    let mut out = [0u8; 16];
    out.copy_from_slice(&hash.as_bytes()[0..16]);
    Ok(out)
}

pub fn config_id_hex(cfg: &ControllerConfig) -> Result<String> {
    Ok(hex16(&config_id_16(cfg)?))
}

fn hex16(id: &[u8; 16]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut s = String::with_capacity(32);
    for &b in id {
        s.push(HEX[(b >> 4) as usize] as char);
        s.push(HEX[(b & 0x0F) as usize] as char);
    }
    s
}
