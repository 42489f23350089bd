//! SpeedHUD CLI - terminal heading and speed display.
//!
//! This binary hosts the SpeedHUD library in a terminal: it owns the
//! display surface, feeds it from X-Plane telemetry or a simulator, and
//! persists the selected unit of measure.

mod commands;
mod error;
mod runner;
mod ui;

use clap::{Parser, Subcommand};
use speedhud::orientation::SourceKind;
use speedhud::units::UnitOfMeasure;

use crate::commands::config::ConfigCommands;
use crate::commands::run::RunArgs;

#[derive(Parser)]
#[command(name = "speedhud")]
#[command(version = speedhud::VERSION)]
#[command(about = "Compass heading and ground speed HUD for the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the HUD
    Run {
        /// Orientation source: xplane or simulated
        #[arg(long)]
        source: Option<SourceKind>,

        /// UDP port for X-Plane telemetry
        #[arg(long)]
        port: Option<u16>,

        /// Speed unit: kmh, mph, kt or mps
        #[arg(long)]
        unit: Option<UnitOfMeasure>,

        /// Render frame rate
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=120))]
        fps: Option<u32>,

        /// Enable debug logging regardless of RUST_LOG
        #[arg(long)]
        debug: bool,

        /// Print a status line instead of drawing the HUD
        #[arg(long)]
        headless: bool,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            source,
            port,
            unit,
            fps,
            debug,
            headless,
        } => commands::run::run(RunArgs {
            source,
            port,
            unit,
            fps,
            debug,
            headless,
        }),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        e.exit();
    }
}
