// crates/orrery-cli/src/cmd/run.rs

use std::time::Duration;

use anyhow::{bail, Context};
use clap::Args;
use log::{info, warn};
use orrery_core::clock::{Clock, ShutdownSignal, SystemClock};
use orrery_core::config::format as config_format;
use orrery_core::control::engine::AxisHardware;
use orrery_core::ephemeris::almanac::SolarAlmanac;
use orrery_core::sim::{
    sim_axis, SharedMechanism, SimHallSensor, SimMechanism, SimStepper, SimulatedClock,
};
use orrery_core::{Axis, ControllerConfig, TrackingLoop};

use crate::io::{config_file, instant};

#[derive(Args)]
pub struct RunArgs {
    /// Controller config (.toml). If omitted, uses built-in defaults.
    #[arg(long)]
    pub config: Option<String>,

    /// Stop after this many tracking cycles (default: run until Ctrl+C)
    #[arg(long)]
    pub cycles: Option<u64>,

    /// Override interval_secs from the config
    #[arg(long)]
    pub interval_secs: Option<u64>,

    /// Fast-forward from this instant (RFC 3339) instead of following the wall
    /// clock: each interval is skipped instantly. Requires --cycles.
    #[arg(long)]
    pub simulate_from: Option<String>,

    /// Simulated orbital disc slot at power-on
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub orbital_start: i64,

    /// Simulated rotation disc slot at power-on
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub rotation_start: i64,

    /// Slot of the magnet on both simulated discs
    #[arg(long, default_value_t = 0)]
    pub magnet_at: i64,

    /// Magnet width in steps (0 simulates a missing magnet)
    #[arg(long, default_value_t = 1)]
    pub magnet_width: u32,

    /// Simulated time per motor pulse
    #[arg(long, default_value_t = 0)]
    pub pulse_delay_ms: u64,
}

struct SimRig {
    orbital: SharedMechanism,
    rotation: SharedMechanism,
}

pub fn run(a: RunArgs) -> anyhow::Result<()> {
    let mut cfg = config_file::load_or_default(a.config.as_deref())?;
    if let Some(secs) = a.interval_secs {
        cfg.interval_secs = secs;
    }
    info!(
        "config_id={} interval={}s",
        config_format::config_id_hex(&cfg)?,
        cfg.interval_secs
    );

    let shutdown = ShutdownSignal::new();
    spawn_signal_listener(shutdown.clone())?;

    match a.simulate_from.as_deref() {
        Some(from) => {
            if a.cycles.is_none() {
                bail!("--simulate-from needs --cycles");
            }
            let start = instant::parse_instant(from)?;
            drive(cfg, SimulatedClock::starting_at(start), &a, shutdown)
        }
        None => drive(cfg, SystemClock, &a, shutdown),
    }
}

fn drive<C: Clock>(
    cfg: ControllerConfig,
    clock: C,
    a: &RunArgs,
    shutdown: ShutdownSignal,
) -> anyhow::Result<()> {
    let (rig, orbital, rotation) = build_rig(&cfg, a);

    let mut lp = TrackingLoop::new(cfg, SolarAlmanac::new(), clock, orbital, rotation)?
        .with_shutdown(shutdown)
        .with_max_cycles(a.cycles);

    let report = lp.run().context("controller run")?;

    println!("cycles         = {}", report.cycles);
    println!("faulted_cycles = {}", report.faulted_cycles);
    println!("finished_at    = {}", lp.clock().now().to_rfc3339());
    for axis in Axis::ALL {
        let st = lp.axis_state(axis);
        let angle = lp.mapper().angle_of(st)?;
        let mech = match axis {
            Axis::Orbital => &rig.orbital,
            Axis::Rotation => &rig.rotation,
        };
        let physical = mech
            .lock()
            .map(|m| m.position())
            .map_err(|_| anyhow::anyhow!("simulated {axis} mechanism lock poisoned"))?;
        println!(
            "{:<8}       = slot={} angle={:.4} zero={} position={} disc={}",
            axis.to_string(),
            st.slot(),
            angle.degrees(),
            st.zero_step_position,
            st.current_step_position,
            physical
        );
    }
    Ok(())
}

type SimHardware = AxisHardware<SimStepper, SimHallSensor>;

fn build_rig(cfg: &ControllerConfig, a: &RunArgs) -> (SimRig, SimHardware, SimHardware) {
    let delay = Duration::from_millis(a.pulse_delay_ms);
    let mech = |axis: Axis, start: i64| {
        SimMechanism::new(cfg.axis(axis).steps_per_revolution)
            .with_position(start)
            .with_magnet(a.magnet_at, a.magnet_width)
            .with_pulse_delay(delay)
    };
    let (om, ost, ohs) = sim_axis(mech(Axis::Orbital, a.orbital_start));
    let (rm, rst, rhs) = sim_axis(mech(Axis::Rotation, a.rotation_start));
    (
        SimRig {
            orbital: om,
            rotation: rm,
        },
        AxisHardware::new(ost, ohs),
        AxisHardware::new(rst, rhs),
    )
}

/// Request shutdown on Ctrl+C or SIGTERM. The loop notices at its next cycle
/// boundary.
fn spawn_signal_listener(shutdown: ShutdownSignal) -> anyhow::Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("build signal runtime")?;
    std::thread::Builder::new()
        .name("orrery-signals".into())
        .spawn(move || rt.block_on(wait_for_shutdown(shutdown)))
        .context("spawn signal thread")?;
    Ok(())
}

async fn wait_for_shutdown(shutdown: ShutdownSignal) {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("cannot listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                warn!("cannot listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, stopping at the next cycle boundary"),
        _ = terminate => info!("received SIGTERM, stopping at the next cycle boundary"),
    }
    shutdown.request();
}
