//! Configuration management CLI commands.
//!
//! Provides `config path`, `config show` and `config set-unit` for viewing
//! and modifying `~/.speedhud/config.ini` from the command line.

use clap::Subcommand;
use speedhud::config::ConfigFile;
use speedhud::units::UnitOfMeasure;

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path, creating a default file if missing
    Path,

    /// Show the effective configuration
    Show,

    /// Set the speed unit shown by the HUD
    SetUnit {
        /// kmh, mph, kt or mps
        unit: String,
    },
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => run_path(),
        ConfigCommands::Show => run_show(),
        ConfigCommands::SetUnit { unit } => run_set_unit(&unit),
    }
}

/// Show the configuration file path, writing defaults there first if needed.
fn run_path() -> Result<(), CliError> {
    let path = ConfigFile::ensure_exists()?;
    println!("{}", path.display());
    Ok(())
}

/// Show all settings, defaults included.
fn run_show() -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    print!("{}", describe(&config));
    Ok(())
}

/// Set and persist the unit of measure.
fn run_set_unit(value: &str) -> Result<(), CliError> {
    // Unlike the config file, the command line rejects unknown units
    let unit: UnitOfMeasure = value.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown unit '{}'. Expected one of: {}",
            value,
            UnitOfMeasure::ALL
                .iter()
                .map(|u| u.token())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    })?;

    let mut config = ConfigFile::load()?;
    config.display.unit = unit;
    config.save()?;

    println!("Set display.unit = {} ({})", unit, unit.label());
    Ok(())
}

fn describe(config: &ConfigFile) -> String {
    format!(
        "[display]\n  unit = {} ({})\n  fps = {}\n  pitch_limit = {}\n\n\
         [telemetry]\n  source = {}\n  port = {}\n\n\
         [logging]\n  file = {}\n",
        config.display.unit,
        config.display.unit.label(),
        config.display.fps,
        config.display.pitch_limit,
        config.telemetry.source,
        config.telemetry.port,
        config.logging.file.display(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_defaults() {
        let text = describe(&ConfigFile::default());
        assert!(text.contains("unit = mph (mph)"));
        assert!(text.contains("fps = 45"));
        assert!(text.contains("source = xplane"));
        assert!(text.contains("port = 49002"));
    }

    #[test]
    fn test_set_unit_rejects_unknown() {
        let err = run_set_unit("furlongs").unwrap_err();
        assert!(err.to_string().contains("kmh, mph, kt, mps"));
    }
}
