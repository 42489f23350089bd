//! Heading and speed HUD state.
//!
//! - [`animator`]: damped heading animation across the 0/360 seam
//! - [`advisory`]: interference / steep-pitch advisories and their crossfade
//! - [`state`]: the single locked state shared by sensors and the render loop
//! - [`controller`]: [`SpeedHud`], wiring a source and a surface together

pub mod advisory;
pub mod animator;
mod controller;
mod state;

pub use advisory::{
    is_too_steep, Advisory, AdvisoryFade, ADVISORY_FADE_DURATION, DEFAULT_PITCH_LIMIT_DEGREES,
};
pub use animator::{AnimationJob, HeadingAnimator, ANIMATION_DURATION, MIN_ANIMATE_THRESHOLD_DEGREES};
pub use controller::{format_heading, HudError, HudPainter, SpeedHud};
pub use state::{DisplaySnapshot, DisplayState, SharedDisplayState};
