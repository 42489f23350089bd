//! HUD rendering.
//!
//! [`CompassRenderer`] is a pure function of a [`DisplaySnapshot`] and the
//! surface size. It never touches shared state, frame pacing or the surface
//! lifecycle.
//!
//! [`DisplaySnapshot`]: crate::hud::DisplaySnapshot

mod canvas;
mod compass;
pub mod recording;
mod speed;

pub use canvas::{Canvas, Color, Paint, Point, SurfaceSize, TextAlign, TextBounds};
pub use compass::{CompassRenderer, MIN_HEIGHT, MIN_WIDTH, REFERENCE_HEIGHT, REFERENCE_WIDTH};
pub use recording::{DrawCommand, RecordingCanvas};
pub use speed::{format_speed, MAX_DISPLAY_SPEED};

use thiserror::Error;

/// Errors raised while drawing a frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("surface {width}x{height} is too small to lay out the HUD")]
    SurfaceTooSmall { width: u32, height: u32 },
}
