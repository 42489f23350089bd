//! Speed readout formatting.

use crate::units::UnitOfMeasure;

/// Largest value the readout shows. Anything faster saturates here so the
/// label never grows past three digits.
pub const MAX_DISPLAY_SPEED: u32 = 999;

/// Text of the speed readout.
///
/// Speeds below 10 show one decimal (`5.4`), everything else is a whole
/// number (`36`), saturating at `999`.
pub fn format_speed(speed_mps: f32, unit: UnitOfMeasure) -> String {
    let speed = unit.from_meters_per_second(speed_mps);
    let speed = if speed.is_finite() { speed.max(0.0) } else { 0.0 };

    let tenths = (speed * 10.0).round() / 10.0;
    if tenths < 10.0 {
        return format!("{:.1}", tenths);
    }

    let whole = speed.round().min(MAX_DISPLAY_SPEED as f64) as u32;
    whole.to_string()
}
