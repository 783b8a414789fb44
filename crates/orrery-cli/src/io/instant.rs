// crates/orrery-cli/src/io/instant.rs

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

/// `now`, or an RFC 3339 timestamp in any offset (normalized to UTC).
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>> {
    if s.eq_ignore_ascii_case("now") {
        return Ok(Utc::now());
    }
    let t = DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("parse instant {s:?} (expected RFC 3339, e.g. 2024-06-20T12:00:00Z)"))?;
    Ok(t.with_timezone(&Utc))
}

pub fn parse_or_now(s: Option<&str>) -> Result<DateTime<Utc>> {
    match s {
        Some(s) => parse_instant(s),
        None => Ok(Utc::now()),
    }
}
