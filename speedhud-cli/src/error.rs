//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use speedhud::config::ConfigFileError;
use speedhud::hud::HudError;
use speedhud::orientation::OrientationError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to read or write the config file
    ConfigFile(ConfigFileError),
    /// Failed to start the HUD
    Hud(HudError),
    /// Terminal setup or I/O failed
    Terminal(std::io::Error),
    /// Failed to build the async runtime
    Runtime(std::io::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::Hud(HudError::Orientation(OrientationError::SocketBind { port, .. })) => {
                eprintln!();
                eprintln!("Common issues:");
                eprintln!("  1. Another program (or another speedhud) is using UDP port {}", port);
                eprintln!("  2. Pick a different port with --port and set X-Plane to send there");
            }
            CliError::ConfigFile(ConfigFileError::InvalidValue { .. }) => {
                eprintln!();
                eprintln!(
                    "Edit {} or run 'speedhud config show' to see current settings.",
                    speedhud::config::config_file_path().display()
                );
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Hud(e) => write!(f, "Failed to start HUD: {}", e),
            CliError::Terminal(e) => write!(f, "Terminal error: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Hud(e) => Some(e),
            CliError::Terminal(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<HudError> for CliError {
    fn from(e: HudError) -> Self {
        CliError::Hud(e)
    }
}

impl From<OrientationError> for CliError {
    fn from(e: OrientationError) -> Self {
        CliError::Hud(HudError::Orientation(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = CliError::Config("bad unit".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad unit");

        let err = CliError::from(OrientationError::SocketBind {
            port: 49002,
            source: std::io::Error::from(std::io::ErrorKind::AddrInUse),
        });
        assert!(err.to_string().contains("49002"));
    }

    #[test]
    fn test_source_chain() {
        use std::error::Error;

        let err = CliError::Terminal(std::io::Error::other("no tty"));
        assert!(err.source().is_some());
        assert!(CliError::LoggingInit("x".to_string()).source().is_none());
    }
}
