// crates/orrery-cli/src/cmd/config.rs

use clap::{Args, Subcommand};
use orrery_core::config::format as config_format;
use orrery_core::{Axis, ControllerConfig};

use crate::io::config_file;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub cmd: ConfigCmd,
}

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Validate a config and print its effective fields and id
    Inspect(InspectArgs),

    /// Write the built-in defaults as TOML
    Default(DefaultArgs),
}

#[derive(Args)]
pub struct InspectArgs {
    /// Config path (.toml)
    #[arg(long)]
    pub config: String,
}

#[derive(Args)]
pub struct DefaultArgs {
    /// Output path. Prints to stdout if omitted.
    #[arg(long)]
    pub out: Option<String>,
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.cmd {
        ConfigCmd::Inspect(a) => cmd_inspect(a),
        ConfigCmd::Default(a) => cmd_default(a),
    }
}

fn cmd_inspect(a: InspectArgs) -> anyhow::Result<()> {
    let cfg = config_file::load_config(&a.config)?;
    let id = config_format::config_id_hex(&cfg)?;

    println!("config_path  = {}", a.config);
    println!("config_id    = {}", id);
    println!("interval     = {}s", cfg.interval_secs);
    println!("max_faults   = {}", cfg.max_consecutive_faults);
    println!("reference    = {}", cfg.reference_instant.to_rfc3339());
    for axis in Axis::ALL {
        print_axis(&cfg, axis);
    }
    Ok(())
}

fn print_axis(cfg: &ControllerConfig, axis: Axis) {
    let c = cfg.axis(axis);
    println!(
        "{axis}.steps_per_revolution = {} ({:.3} deg/step)",
        c.steps_per_revolution,
        360.0 / f64::from(c.steps_per_revolution)
    );
    println!(
        "{axis}.homing = {:?} {:?} budget={}",
        c.homing_strategy, c.homing_direction, c.homing_budget
    );
    println!("{axis}.sensor_width_budget = {}", c.sensor_width_budget);
    println!("{axis}.max_steps_per_cycle = {}", c.max_steps_per_cycle);
}

fn cmd_default(a: DefaultArgs) -> anyhow::Result<()> {
    let cfg = ControllerConfig::default();
    match a.out {
        Some(path) => {
            config_file::save_config(&path, &cfg)?;
            eprintln!("wrote {path}");
        }
        None => print!("{}", config_format::encode(&cfg)?),
    }
    Ok(())
}
