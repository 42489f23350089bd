//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[display]
; Unit of the speed readout:
;   kmh - kilometers per hour
;   mph - miles per hour (default)
;   kt  - knots
;   mps - meters per second
; Unknown values fall back to mph
unit = {}
; Render loop frame rate, 1-120 (default: 45)
fps = {}
; Pitch in degrees beyond which the heading is flagged unreliable (default: 70)
pitch_limit = {}

[telemetry]
; Orientation source:
;   xplane    - X-Plane UDP telemetry (Settings → Network → "Send position to ForeFlight")
;   simulated - scripted motion, no simulator required
source = {}
; UDP port for X-Plane telemetry (default: 49002)
port = {}

[logging]
; Log file path (truncated at the start of every session)
file = {}
"#,
        config.display.unit,
        config.display.fps,
        config.display.pitch_limit,
        config.telemetry.source,
        config.telemetry.port,
        path_to_string(&config.logging.file),
    )
}

/// Render a path, collapsing the home directory back to `~`.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
