//! User configuration stored in `~/.speedhud/config.ini`.
//!
//! ```ini
//! [display]
//! unit = kmh
//! fps = 45
//! pitch_limit = 70
//!
//! [telemetry]
//! source = xplane
//! port = 49002
//!
//! [logging]
//! file = ~/.speedhud/speedhud.log
//! ```

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::{DEFAULT_LOG_FILE, MAX_FPS, MIN_FPS};
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{ConfigFile, DisplaySettings, LoggingSettings, TelemetrySettings};
