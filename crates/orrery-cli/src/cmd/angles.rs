// crates/orrery-cli/src/cmd/angles.rs

use clap::Args;
use orrery_core::ephemeris::almanac::{effective_rotation, SolarAlmanac};
use orrery_core::AngleSource;

use crate::io::instant;

#[derive(Args)]
pub struct AnglesArgs {
    /// Instant, RFC 3339 or `now` (default: now)
    #[arg(long)]
    pub at: Option<String>,

    /// Number of samples to print
    #[arg(long, default_value_t = 1)]
    pub count: u32,

    /// Minutes between samples
    #[arg(long, default_value_t = 60)]
    pub step_mins: i64,
}

pub fn run(a: AnglesArgs) -> anyhow::Result<()> {
    let start = instant::parse_or_now(a.at.as_deref())?;
    let almanac = SolarAlmanac::new();

    for i in 0..a.count {
        let t = start + chrono::Duration::minutes(a.step_mins * i64::from(i));
        let raw = almanac.angles_at(t)?;
        println!(
            "{}  orbital={:.4} rotation={:.4} hour_angle={:.4}",
            t.to_rfc3339(),
            raw.orbital.degrees(),
            raw.rotation.degrees(),
            effective_rotation(&raw).degrees()
        );
    }
    Ok(())
}
