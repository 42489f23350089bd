//! Default values and constants for all configuration settings.

use super::file::config_directory;
use super::settings::*;
use crate::hud::DEFAULT_PITCH_LIMIT_DEGREES;
use crate::orientation::{SourceKind, DEFAULT_TELEMETRY_PORT};
use crate::scheduler::DEFAULT_FPS;
use crate::units::UnitOfMeasure;

/// Lowest accepted frame rate.
pub const MIN_FPS: u32 = 1;

/// Highest accepted frame rate.
pub const MAX_FPS: u32 = 120;

/// Default log file name inside the config directory.
pub const DEFAULT_LOG_FILE: &str = "speedhud.log";

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            display: DisplaySettings {
                unit: UnitOfMeasure::default(),
                fps: DEFAULT_FPS,
                pitch_limit: DEFAULT_PITCH_LIMIT_DEGREES,
            },
            telemetry: TelemetrySettings {
                source: SourceKind::default(),
                port: DEFAULT_TELEMETRY_PORT,
            },
            logging: LoggingSettings {
                file: config_directory().join(DEFAULT_LOG_FILE),
            },
        }
    }
}
