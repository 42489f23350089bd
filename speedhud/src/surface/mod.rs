//! Drawable surfaces and the scoped per-frame draw step.
//!
//! A [`Surface`] hands out a canvas for exactly one frame. [`draw_frame`]
//! is the only place that acquires one, and it posts the canvas back on
//! every path once the acquire succeeded, including when the draw returns
//! an error or panics.

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

use crate::render::{Canvas, RenderError};

/// Errors raised by a surface backend.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The surface cannot hand out a canvas right now (e.g. torn down
    /// concurrently). The next frame retries.
    #[error("surface unavailable: {0}")]
    Unavailable(String),

    /// Presenting a drawn canvas failed.
    #[error("failed to post canvas: {0}")]
    PostFailed(String),

    #[error("surface I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A drawing target owned by the render loop.
pub trait Surface: Send {
    type Canvas: Canvas;

    /// Acquire a canvas for one frame.
    fn lock_canvas(&mut self) -> Result<Self::Canvas, SurfaceError>;

    /// Present `canvas` and give it back to the surface.
    fn unlock_canvas_and_post(&mut self, canvas: Self::Canvas) -> Result<(), SurfaceError>;
}

/// Why a draw did not complete.
#[derive(Debug)]
pub enum DrawFailure {
    Render(RenderError),
    Panic(String),
}

impl std::fmt::Display for DrawFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawFailure::Render(e) => write!(f, "{}", e),
            DrawFailure::Panic(msg) => write!(f, "draw panicked: {}", msg),
        }
    }
}

/// Result of one pass through [`draw_frame`].
#[derive(Debug)]
pub enum FrameOutcome {
    /// Drawn and posted.
    Presented,
    /// The canvas could not be acquired; nothing was drawn.
    Skipped(SurfaceError),
    /// The draw failed; the canvas was still posted.
    DrawFailed(DrawFailure),
    /// The draw succeeded but posting failed.
    PostFailed(SurfaceError),
}

impl FrameOutcome {
    pub fn is_presented(&self) -> bool {
        matches!(self, FrameOutcome::Presented)
    }

    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            FrameOutcome::Presented => "presented",
            FrameOutcome::Skipped(_) => "skipped",
            FrameOutcome::DrawFailed(_) => "draw_failed",
            FrameOutcome::PostFailed(_) => "post_failed",
        }
    }
}

/// Acquire a canvas, run `draw` on it, and post it back.
///
/// A draw failure takes precedence over a post failure in the returned
/// outcome; the post is attempted either way.
pub fn draw_frame<S, F>(surface: &mut S, draw: F) -> FrameOutcome
where
    S: Surface,
    F: FnOnce(&mut dyn Canvas) -> Result<(), RenderError>,
{
    let mut canvas = match surface.lock_canvas() {
        Ok(canvas) => canvas,
        Err(e) => return FrameOutcome::Skipped(e),
    };

    let drawn = panic::catch_unwind(AssertUnwindSafe(|| draw(&mut canvas)));
    let posted = surface.unlock_canvas_and_post(canvas);

    match (drawn, posted) {
        (Ok(Ok(())), Ok(())) => FrameOutcome::Presented,
        (Ok(Ok(())), Err(e)) => FrameOutcome::PostFailed(e),
        (Ok(Err(e)), _) => FrameOutcome::DrawFailed(DrawFailure::Render(e)),
        (Err(payload), _) => FrameOutcome::DrawFailed(DrawFailure::Panic(panic_message(&*payload))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
