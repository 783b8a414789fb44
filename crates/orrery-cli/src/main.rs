// crates/orrery-cli/src/main.rs

use clap::{Parser, Subcommand};
use env_logger::Env;

mod cmd;
mod io;

#[derive(Parser)]
#[command(name = "orrery-cli")]
#[command(about = "Earth orrery controller: homing, calibration and sun tracking", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Home both axes, calibrate, then track the almanac (simulated rig)
    Run(cmd::run::RunArgs),

    /// Print almanac angles for an instant
    Angles(cmd::angles::AnglesArgs),

    /// Show the targets the controller would command at an instant
    Plan(cmd::plan::PlanArgs),

    /// Controller config tools (TOML)
    Config(cmd::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Run(args) => cmd::run::run(args),
        Commands::Angles(args) => cmd::angles::run(args),
        Commands::Plan(args) => cmd::plan::run(args),
        Commands::Config(args) => cmd::config::run(args),
    }
}
