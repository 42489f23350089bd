//! X-Plane telemetry protocol parsing.
//!
//! Supports three packet families:
//! - **XATT/XATT2** (ForeFlight) - text, heading and pitch
//! - **XGPS/XGPS2** (ForeFlight) - text, ground speed in m/s
//! - **DATA** (legacy) - binary records, speeds (index 3) and attitude (index 17)

use tracing::trace;

use crate::angle::normalize;
use crate::orientation::OrientationEvent;

/// Size of the X-Plane DATA packet header ("DATA" + 1 byte).
const DATA_HEADER_SIZE: usize = 5;

/// Size of each data record (4-byte index + 8 floats).
const DATA_RECORD_SIZE: usize = 36;

/// X-Plane data index for speeds (ground speed in knots is the 4th float).
const INDEX_SPEEDS: u32 = 3;

/// X-Plane data index for pitch/roll/headings.
const INDEX_HEADINGS: u32 = 17;

/// Conversion factor: meters per second to knots.
const MS_TO_KNOTS: f32 = 1.94384;

/// Values carried by a single packet.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TelemetryUpdate {
    pub heading: Option<f32>,
    pub pitch: Option<f32>,
    pub speed_mps: Option<f32>,
}

impl TelemetryUpdate {
    pub fn has_any(&self) -> bool {
        self.heading.is_some() || self.pitch.is_some() || self.speed_mps.is_some()
    }

    /// Orientation events for this update.
    ///
    /// A packet with heading but no pitch reuses `last_pitch`, since the
    /// events always carry both.
    pub fn events(&self, last_pitch: f32) -> Vec<OrientationEvent> {
        let mut events = Vec::with_capacity(2);
        if let Some(heading) = self.heading {
            events.push(OrientationEvent::OrientationChanged {
                heading,
                pitch: self.pitch.unwrap_or(last_pitch),
            });
        }
        if let Some(speed_mps) = self.speed_mps {
            events.push(OrientationEvent::LocationChanged { speed_mps });
        }
        events
    }
}

/// Parse a telemetry packet (auto-detects protocol).
pub fn parse_packet(data: &[u8]) -> Option<TelemetryUpdate> {
    // XGPS2/XATT2 share their prefix with XGPS/XATT
    if data.len() >= 4 {
        if &data[0..4] == b"XGPS" {
            return parse_foreflight_xgps(data);
        }
        if &data[0..4] == b"XATT" {
            return parse_foreflight_xatt(data);
        }
        if &data[0..4] == b"DATA" {
            return parse_xplane_data(data);
        }
    }

    None
}

/// Parse ForeFlight XGPS message.
///
/// Format: `XGPSSimName,lon,lat,alt_m,track,gs_m/s`
fn parse_foreflight_xgps(data: &[u8]) -> Option<TelemetryUpdate> {
    let text = std::str::from_utf8(data).ok()?;

    let parts: Vec<&str> = text.trim().split(',').collect();
    if parts.len() < 6 {
        trace!("XGPS packet too short: {} parts", parts.len());
        return None;
    }

    let groundspeed_ms: f32 = parts[5].trim().parse().ok()?;

    Some(TelemetryUpdate {
        speed_mps: Some(groundspeed_ms),
        ..Default::default()
    })
}

/// Parse ForeFlight XATT message.
///
/// Format: `XATTSimName,heading,pitch,roll`
fn parse_foreflight_xatt(data: &[u8]) -> Option<TelemetryUpdate> {
    let text = std::str::from_utf8(data).ok()?;

    let parts: Vec<&str> = text.trim().split(',').collect();
    if parts.len() < 4 {
        trace!("XATT packet too short: {} parts", parts.len());
        return None;
    }

    let heading: f32 = parts[1].trim().parse().ok()?;
    let pitch: f32 = parts[2].trim().parse().ok()?;

    Some(TelemetryUpdate {
        heading: Some(normalize(heading)),
        pitch: Some(pitch),
        ..Default::default()
    })
}

/// Parse legacy X-Plane binary DATA packet.
fn parse_xplane_data(data: &[u8]) -> Option<TelemetryUpdate> {
    if data.len() < DATA_HEADER_SIZE {
        return None;
    }

    let mut update = TelemetryUpdate::default();

    let records = &data[DATA_HEADER_SIZE..];
    for chunk in records.chunks_exact(DATA_RECORD_SIZE) {
        let index = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);

        let floats: [f32; 8] = std::array::from_fn(|i| {
            let offset = 4 + i * 4;
            f32::from_le_bytes([
                chunk[offset],
                chunk[offset + 1],
                chunk[offset + 2],
                chunk[offset + 3],
            ])
        });

        match index {
            INDEX_SPEEDS => {
                // [vind_kias, vind_keas, vtrue_ktas, vtrue_ktgs, ...]
                update.speed_mps = Some(floats[3] / MS_TO_KNOTS);
            }
            INDEX_HEADINGS => {
                // [pitch, roll, hding_true, hding_mag, ...]
                update.pitch = Some(floats[0]);
                update.heading = Some(normalize(floats[2]));
            }
            _ => {}
        }
    }

    if update.has_any() {
        Some(update)
    } else {
        None
    }
}
