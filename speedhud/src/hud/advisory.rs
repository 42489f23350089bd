//! Advisory selection and crossfade.
//!
//! At most one advisory is shown. Magnetic interference outranks a pitch
//! that is too steep for a reliable heading.

use std::time::{Duration, Instant};

use crate::angle::lerp;

/// Default absolute pitch, in degrees, beyond which the heading is unreliable.
pub const DEFAULT_PITCH_LIMIT_DEGREES: f32 = 70.0;

/// Duration of a full 0 to 1 opacity fade.
pub const ADVISORY_FADE_DURATION: Duration = Duration::from_millis(300);

/// The advisory currently selected for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Advisory {
    #[default]
    None,
    Interference,
    TooSteep,
}

impl Advisory {
    /// Pick the single advisory to display.
    pub fn select(interference: bool, too_steep: bool) -> Self {
        if interference {
            Advisory::Interference
        } else if too_steep {
            Advisory::TooSteep
        } else {
            Advisory::None
        }
    }

    /// Text shown for this advisory, `None` when nothing is shown.
    pub fn message(self) -> Option<&'static str> {
        match self {
            Advisory::None => None,
            Advisory::Interference => Some("Magnetic interference"),
            Advisory::TooSteep => Some("Pitch too steep"),
        }
    }

    pub fn is_shown(self) -> bool {
        self != Advisory::None
    }
}

/// Whether `pitch` (degrees) exceeds `limit` in either direction.
pub fn is_too_steep(pitch: f32, limit: f32) -> bool {
    pitch.abs() > limit
}

/// Opacity animation for the advisory text.
///
/// Visibility changes (to or from [`Advisory::None`]) fade linearly over
/// [`ADVISORY_FADE_DURATION`]. Switching between two visible advisories only
/// swaps the text. While fading out the last visible text is kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdvisoryFade {
    current: Advisory,
    text: Option<&'static str>,
    opacity: f32,
    fade: Option<Fade>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Fade {
    from: f32,
    to: f32,
    start_time: Instant,
}

impl Default for AdvisoryFade {
    fn default() -> Self {
        Self::new()
    }
}

impl AdvisoryFade {
    pub fn new() -> Self {
        Self {
            current: Advisory::None,
            text: None,
            opacity: 0.0,
            fade: None,
        }
    }

    /// Apply a new selection observed at `now`.
    pub fn set(&mut self, advisory: Advisory, now: Instant) {
        if advisory == self.current {
            return;
        }
        let was_shown = self.current.is_shown();
        self.current = advisory;

        if let Some(text) = advisory.message() {
            self.text = Some(text);
        }

        if was_shown != advisory.is_shown() {
            self.advance(now);
            let to = if advisory.is_shown() { 1.0 } else { 0.0 };
            self.fade = Some(Fade {
                from: self.opacity,
                to,
                start_time: now,
            });
        }
    }

    /// Step the opacity to `now`. Called once per frame.
    pub fn advance(&mut self, now: Instant) {
        let Some(fade) = self.fade else {
            return;
        };

        // A partial swing takes a proportional share of the full duration
        let span = (fade.to - fade.from).abs();
        let duration = ADVISORY_FADE_DURATION.as_secs_f32() * span;
        let elapsed = now.saturating_duration_since(fade.start_time).as_secs_f32();
        let progress = if duration <= 0.0 {
            1.0
        } else {
            (elapsed / duration).clamp(0.0, 1.0)
        };

        self.opacity = lerp(fade.from, fade.to, progress);
        if progress >= 1.0 {
            self.opacity = fade.to;
            self.fade = None;
            if !self.current.is_shown() {
                self.text = None;
            }
        }
    }

    /// The selected advisory (not necessarily fully visible yet).
    pub fn advisory(&self) -> Advisory {
        self.current
    }

    /// Text to draw, kept while fading out.
    pub fn text(&self) -> Option<&'static str> {
        self.text
    }

    /// Opacity in [0, 1].
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }
}
