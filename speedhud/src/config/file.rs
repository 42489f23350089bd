//! Reading and writing `~/.speedhud/config.ini`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use super::settings::ConfigFile;

const CONFIG_DIR_NAME: &str = ".speedhud";
const CONFIG_FILE_NAME: &str = "config.ini";

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigFile {
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        match Ini::load_from_file(path) {
            Ok(ini) => super::parser::parse_ini(&ini),
            Err(ini::Error::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigFileError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn save(&self) -> Result<(), ConfigFileError> {
        self.save_to(&config_file_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        let write_error = |source| ConfigFileError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        std::fs::write(path, super::writer::to_config_string(self)).map_err(write_error)
    }

    /// Write a default config file unless one is already there, and return
    /// its path.
    pub fn ensure_exists() -> Result<PathBuf, ConfigFileError> {
        let path = config_file_path();
        Self::ensure_exists_at(&path)?;
        Ok(path)
    }

    fn ensure_exists_at(path: &Path) -> Result<(), ConfigFileError> {
        if path.exists() {
            return Ok(());
        }
        Self::default().save_to(path)
    }
}

/// `~/.speedhud`, or `./.speedhud` without a home directory.
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::SourceKind;
    use crate::units::UnitOfMeasure;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();

        assert_eq!(config.display.unit, UnitOfMeasure::MilesPerHour);
        assert_eq!(config.display.fps, 45);
        assert_eq!(config.display.pitch_limit, 70.0);
        assert_eq!(config.telemetry.source, SourceKind::XPlane);
        assert_eq!(config.telemetry.port, 49002);
        assert!(config.logging.file.ends_with("speedhud.log"));
    }

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let config = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.ini");

        ConfigFile::default().save_to(&config_path).unwrap();
        assert!(config_path.exists());
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");

        let mut config = ConfigFile::default();
        config.display.unit = UnitOfMeasure::Knots;
        config.display.fps = 30;
        config.display.pitch_limit = 55.5;
        config.telemetry.source = SourceKind::Simulated;
        config.telemetry.port = 49010;
        config.logging.file = temp_dir.path().join("hud.log");
        config.save_to(&config_path).unwrap();

        let loaded = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_ensure_exists_keeps_user_edits() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");

        ConfigFile::ensure_exists_at(&config_path).unwrap();
        assert_eq!(
            ConfigFile::load_from(&config_path).unwrap(),
            ConfigFile::default()
        );

        let mut config = ConfigFile::default();
        config.display.unit = UnitOfMeasure::Knots;
        config.save_to(&config_path).unwrap();

        ConfigFile::ensure_exists_at(&config_path).unwrap();
        let loaded = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(loaded.display.unit, UnitOfMeasure::Knots);
    }

    #[test]
    fn test_unreadable_file_reports_path() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        // A directory where the file should be cannot be read as INI
        let err = ConfigFile::load_from(temp_dir.path()).unwrap_err();
        match err {
            ConfigFileError::Read { path, .. } => assert_eq!(path, temp_dir.path()),
            other => panic!("expected read error, got {other}"),
        }
    }

    #[test]
    fn test_config_paths() {
        assert!(config_directory().ends_with(".speedhud"));
        assert!(config_file_path().ends_with(".speedhud/config.ini"));
    }
}
