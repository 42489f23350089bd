//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;
use tracing::warn;

use super::defaults::{MAX_FPS, MIN_FPS};
use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::units::UnitOfMeasure;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [display] section
    if let Some(section) = ini.section(Some("display")) {
        if let Some(v) = section.get("unit") {
            // Unknown units fall back to the default instead of failing
            config.display.unit = v.parse().unwrap_or_else(|_| {
                warn!(
                    value = v,
                    fallback = %UnitOfMeasure::default(),
                    "Unknown unit of measure in config, using default"
                );
                UnitOfMeasure::default()
            });
        }
        if let Some(v) = section.get("fps") {
            let fps: u32 = v.trim().parse().map_err(|_| invalid(
                "display",
                "fps",
                v,
                "must be a positive integer",
            ))?;
            if !(MIN_FPS..=MAX_FPS).contains(&fps) {
                return Err(invalid(
                    "display",
                    "fps",
                    v,
                    &format!("must be between {} and {}", MIN_FPS, MAX_FPS),
                ));
            }
            config.display.fps = fps;
        }
        if let Some(v) = section.get("pitch_limit") {
            let limit: f32 = v.trim().parse().map_err(|_| {
                invalid("display", "pitch_limit", v, "must be a number of degrees")
            })?;
            if !(limit > 0.0 && limit <= 90.0) {
                return Err(invalid(
                    "display",
                    "pitch_limit",
                    v,
                    "must be greater than 0 and at most 90",
                ));
            }
            config.display.pitch_limit = limit;
        }
    }

    // [telemetry] section
    if let Some(section) = ini.section(Some("telemetry")) {
        if let Some(v) = section.get("source") {
            config.telemetry.source = v
                .parse()
                .map_err(|_| invalid("telemetry", "source", v, "must be 'xplane' or 'simulated'"))?;
        }
        if let Some(v) = section.get("port") {
            config.telemetry.port = v
                .trim()
                .parse()
                .map_err(|_| invalid("telemetry", "port", v, "must be a port number (0-65535)"))?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Expand a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::SourceKind;
    use tempfile::TempDir;

    fn load(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(&config_path, content).unwrap();
        ConfigFile::load_from(&config_path)
    }

    #[test]
    fn test_partial_config() {
        let config = load(
            r#"
[display]
unit = kmh
"#,
        )
        .unwrap();

        assert_eq!(config.display.unit, UnitOfMeasure::KilometersPerHour);
        assert_eq!(config.display.fps, 45);
        assert_eq!(config.telemetry.port, 49002);
    }

    #[test]
    fn test_unknown_unit_falls_back_to_default() {
        let config = load(
            r#"
[display]
unit = furlongs_per_fortnight
"#,
        )
        .unwrap();
        assert_eq!(config.display.unit, UnitOfMeasure::MilesPerHour);
    }

    #[test]
    fn test_invalid_fps() {
        let err = load(
            r#"
[display]
fps = fast
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("fps"));

        let err = load(
            r#"
[display]
fps = 500
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("between 1 and 120"));
    }

    #[test]
    fn test_invalid_pitch_limit() {
        let err = load(
            r#"
[display]
pitch_limit = 95
"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigFileError::InvalidValue { ref key, .. } if key == "pitch_limit"
        ));
    }

    #[test]
    fn test_telemetry_section() {
        let config = load(
            r#"
[telemetry]
source = simulated
port = 49005
"#,
        )
        .unwrap();
        assert_eq!(config.telemetry.source, SourceKind::Simulated);
        assert_eq!(config.telemetry.port, 49005);
    }

    #[test]
    fn test_invalid_source() {
        let err = load(
            r#"
[telemetry]
source = garmin
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("telemetry.source"));
    }

    #[test]
    fn test_invalid_port() {
        assert!(load("[telemetry]\nport = 70000\n").is_err());
    }

    #[test]
    fn test_logging_file_expands_tilde() {
        let config = load("[logging]\nfile = ~/logs/hud.log\n").unwrap();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.logging.file, home.join("logs/hud.log"));
        }
    }

    #[test]
    fn test_expand_tilde() {
        let path = expand_tilde("~/test/path");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path, home.join("test/path"));
        }

        // Non-tilde paths should be unchanged
        let path = expand_tilde("/absolute/path");
        assert_eq!(path, PathBuf::from("/absolute/path"));
    }
}
