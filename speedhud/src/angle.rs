//! Circular angle helpers.
//!
//! All headings in the HUD are degrees on a compass circle where 0 is north
//! and values increase clockwise. These helpers keep every stored heading in
//! the half-open range [0, 360) and answer "which way round is shorter"
//! questions at the 0/360 seam.

/// Abbreviations for the 16 half-wind compass points, starting at north and
/// proceeding clockwise in 22.5° steps.
pub const DIRECTIONS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Degrees between two adjacent half-wind points.
pub const DEGREES_PER_HALF_WIND: f32 = 360.0 / DIRECTIONS.len() as f32;

/// Normalize an angle to the half-open range [0, 360).
///
/// Uses floor-mod semantics, so negative inputs wrap from the top
/// (`normalize(-10.0) == 350.0`). Non-finite inputs yield 0.0.
pub fn normalize(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Signed distance from `from` to `to` travelling the shorter way round.
///
/// The result lies in (-180, 180]. Positive values are clockwise. An exact
/// half-turn resolves to +180.
pub fn shortest_delta(from: f32, to: f32) -> f32 {
    let wrapped = normalize(to - from);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Index into [`DIRECTIONS`] of the half-wind point nearest to `heading`.
pub fn half_wind_index(heading: f32) -> usize {
    let steps = (normalize(heading) / DEGREES_PER_HALF_WIND).round() as usize;
    steps % DIRECTIONS.len()
}

/// Abbreviation of the half-wind point nearest to `heading` (e.g. "SSW").
pub fn direction_name(heading: f32) -> &'static str {
    DIRECTIONS[half_wind_index(heading)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize(0.0), 0.0);
        assert_eq!(normalize(90.0), 90.0);
        assert_eq!(normalize(360.0), 0.0);
        assert_eq!(normalize(450.0), 90.0);
        assert_eq!(normalize(-10.0), 350.0);
        assert_eq!(normalize(-370.0), 350.0);
    }

    #[test]
    fn test_normalize_non_finite() {
        assert_eq!(normalize(f32::NAN), 0.0);
        assert_eq!(normalize(f32::INFINITY), 0.0);
        assert_eq!(normalize(f32::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_normalize_tiny_negative_stays_in_range() {
        let n = normalize(-1e-10);
        assert!((0.0..360.0).contains(&n));
    }

    #[test]
    fn test_shortest_delta_direct() {
        assert_eq!(shortest_delta(10.0, 20.0), 10.0);
        assert_eq!(shortest_delta(20.0, 10.0), -10.0);
    }

    #[test]
    fn test_shortest_delta_across_seam() {
        assert_eq!(shortest_delta(350.0, 10.0), 20.0);
        assert_eq!(shortest_delta(10.0, 350.0), -20.0);
    }

    #[test]
    fn test_shortest_delta_half_turn_is_clockwise() {
        assert_eq!(shortest_delta(0.0, 180.0), 180.0);
        assert_eq!(shortest_delta(180.0, 0.0), 180.0);
        assert_eq!(shortest_delta(90.0, 270.0), 180.0);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(10.0, 200.0, 0.0), 10.0);
        assert_eq!(lerp(10.0, 200.0, 1.0), 200.0);
        assert_eq!(lerp(10.0, 200.0, 0.5), 105.0);
    }

    #[test]
    fn test_half_wind_index() {
        assert_eq!(half_wind_index(0.0), 0);
        assert_eq!(half_wind_index(11.0), 0);
        assert_eq!(half_wind_index(12.0), 1);
        assert_eq!(half_wind_index(90.0), 4);
        assert_eq!(half_wind_index(355.0), 0);
        assert_eq!(half_wind_index(-90.0), 12);
    }

    #[test]
    fn test_direction_name() {
        assert_eq!(direction_name(0.0), "N");
        assert_eq!(direction_name(45.0), "NE");
        assert_eq!(direction_name(202.5), "SSW");
        assert_eq!(direction_name(359.0), "N");
    }

    proptest! {
        #[test]
        fn prop_normalize_in_range(x in -1.0e6f32..1.0e6f32) {
            let n = normalize(x);
            prop_assert!((0.0..360.0).contains(&n));
        }

        #[test]
        fn prop_normalize_idempotent(x in -1.0e6f32..1.0e6f32) {
            let n = normalize(x);
            prop_assert_eq!(normalize(n), n);
        }

        #[test]
        fn prop_shortest_delta_bounded(a in 0.0f32..360.0, b in 0.0f32..360.0) {
            let d = shortest_delta(a, b);
            prop_assert!(d > -180.0 && d <= 180.0);
        }

        #[test]
        fn prop_shortest_delta_reaches_target(a in 0.0f32..360.0, b in 0.0f32..360.0) {
            let reached = normalize(a + shortest_delta(a, b));
            let target = normalize(b);
            // Compare on the circle so 359.9999 and 0.0 count as equal
            let error = shortest_delta(reached, target).abs();
            prop_assert!(error < 1e-3, "reached {} expected {}", reached, target);
        }
    }
}
