// crates/orrery-cli/src/cmd/plan.rs

use clap::Args;
use orrery_core::control::mapper::{angle_to_slot, AngleMapper};
use orrery_core::control::planner::MotionPlanner;
use orrery_core::ephemeris::almanac::SolarAlmanac;
use orrery_core::{AngleSource, Axis, AxisState};

use crate::io::{config_file, instant};

/// Dry run of one tracking cycle: no hardware, positions given on the command line.
#[derive(Args)]
pub struct PlanArgs {
    /// Controller config (.toml). If omitted, uses built-in defaults.
    #[arg(long)]
    pub config: Option<String>,

    /// Instant, RFC 3339 or `now` (default: now)
    #[arg(long)]
    pub at: Option<String>,

    /// Orbital position in steps from its homed zero
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub orbital_steps: i64,

    /// Rotation position in steps from its homed zero
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub rotation_steps: i64,
}

pub fn run(a: PlanArgs) -> anyhow::Result<()> {
    let cfg = config_file::load_or_default(a.config.as_deref())?;
    let t = instant::parse_or_now(a.at.as_deref())?;
    let almanac = SolarAlmanac::new();

    let mut mapper = AngleMapper::new();
    mapper.initialize_reference(almanac.angles_at(cfg.reference_instant)?)?;
    let raw = almanac.angles_at(t)?;

    println!("at           = {}", t.to_rfc3339());
    println!("reference    = {}", cfg.reference_instant.to_rfc3339());

    for axis in Axis::ALL {
        let axis_cfg = cfg.axis(axis);
        let st = AxisState {
            axis,
            homed: true,
            zero_step_position: 0,
            current_step_position: match axis {
                Axis::Orbital => a.orbital_steps,
                Axis::Rotation => a.rotation_steps,
            },
            steps_per_revolution: axis_cfg.steps_per_revolution,
        };
        let target = mapper.target_angle(&raw, axis)?;
        let count = mapper.target_step_count(&st, target)?;
        let delta = MotionPlanner::new(axis_cfg.max_steps_per_cycle).plan_move(&st, count);

        println!(
            "{:<8}     = angle={:.4} slot={} target={} position={} delta={:+}",
            axis.to_string(),
            target.degrees(),
            angle_to_slot(target, axis_cfg.steps_per_revolution),
            count,
            st.current_step_position,
            delta
        );
    }
    Ok(())
}
