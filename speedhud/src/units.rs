//! Speed units of measure.
//!
//! The host persists the selected unit opaquely, either as a small integer
//! code or as a config token. Anything outside the known set maps back to
//! the default unit instead of failing.

use std::fmt;
use std::str::FromStr;

/// Meters per second in one kilometer per hour.
const KMH_IN_MPS: f64 = 0.277777778;

/// Meters per second in one mile per hour.
const MPH_IN_MPS: f64 = 0.44704;

/// Meters per second in one knot.
const KT_IN_MPS: f64 = 0.514444444;

/// Unit used for the speed readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UnitOfMeasure {
    /// Kilometers per hour.
    KilometersPerHour,
    /// Miles per hour.
    #[default]
    MilesPerHour,
    /// Nautical miles per hour.
    Knots,
    /// Meters per second (no conversion).
    MetersPerSecond,
}

impl UnitOfMeasure {
    /// All units in cycling order.
    pub const ALL: [UnitOfMeasure; 4] = [
        UnitOfMeasure::KilometersPerHour,
        UnitOfMeasure::MilesPerHour,
        UnitOfMeasure::Knots,
        UnitOfMeasure::MetersPerSecond,
    ];

    /// Stable integer code for opaque persistence.
    pub fn code(self) -> i32 {
        match self {
            UnitOfMeasure::KilometersPerHour => 0,
            UnitOfMeasure::MilesPerHour => 1,
            UnitOfMeasure::Knots => 2,
            UnitOfMeasure::MetersPerSecond => 3,
        }
    }

    /// Decode a persisted code. Unknown codes fall back to the default unit.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => UnitOfMeasure::KilometersPerHour,
            1 => UnitOfMeasure::MilesPerHour,
            2 => UnitOfMeasure::Knots,
            3 => UnitOfMeasure::MetersPerSecond,
            _ => UnitOfMeasure::default(),
        }
    }

    /// Config token (`kmh`, `mph`, `kt`, `mps`).
    pub fn token(self) -> &'static str {
        match self {
            UnitOfMeasure::KilometersPerHour => "kmh",
            UnitOfMeasure::MilesPerHour => "mph",
            UnitOfMeasure::Knots => "kt",
            UnitOfMeasure::MetersPerSecond => "mps",
        }
    }

    /// Label drawn next to the speed readout.
    pub fn label(self) -> &'static str {
        match self {
            UnitOfMeasure::KilometersPerHour => "km/h",
            UnitOfMeasure::MilesPerHour => "mph",
            UnitOfMeasure::Knots => "kt",
            UnitOfMeasure::MetersPerSecond => "m/s",
        }
    }

    /// Convert a speed in meters per second into this unit.
    pub fn from_meters_per_second(self, speed_mps: f32) -> f64 {
        let speed = speed_mps as f64;
        match self {
            UnitOfMeasure::KilometersPerHour => speed / KMH_IN_MPS,
            UnitOfMeasure::MilesPerHour => speed / MPH_IN_MPS,
            UnitOfMeasure::Knots => speed / KT_IN_MPS,
            UnitOfMeasure::MetersPerSecond => speed,
        }
    }

    /// The unit after this one, wrapping around.
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|u| *u == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for UnitOfMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Error returned when a unit token is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown unit of measure '{0}' (expected kmh, mph, kt or mps)")]
pub struct ParseUnitError(pub String);

impl FromStr for UnitOfMeasure {
    type Err = ParseUnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kmh" | "km/h" | "kph" => Ok(UnitOfMeasure::KilometersPerHour),
            "mph" => Ok(UnitOfMeasure::MilesPerHour),
            "kt" | "kts" | "knots" => Ok(UnitOfMeasure::Knots),
            "mps" | "m/s" => Ok(UnitOfMeasure::MetersPerSecond),
            other => Err(ParseUnitError(other.to_string())),
        }
    }
}
