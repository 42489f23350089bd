//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;

use crate::orientation::SourceKind;
use crate::units::UnitOfMeasure;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Display settings
    pub display: DisplaySettings,
    /// Telemetry source settings
    pub telemetry: TelemetrySettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// HUD display configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    /// Unit of the speed readout
    pub unit: UnitOfMeasure,
    /// Target frame rate of the render loop
    pub fps: u32,
    /// Absolute pitch (degrees) beyond which the heading is flagged unreliable
    pub pitch_limit: f32,
}

/// Orientation source configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySettings {
    /// Which source feeds the HUD
    pub source: SourceKind,
    /// UDP port for X-Plane telemetry
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}
