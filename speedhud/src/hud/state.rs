//! Shared display state.
//!
//! Sensor callbacks and the render loop run on different threads. Every
//! field they touch lives in one [`DisplayState`] behind a single mutex, and
//! the renderer only ever sees a [`DisplaySnapshot`] copied out under that
//! lock, so it never observes a torn combination of fields.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use super::advisory::{is_too_steep, Advisory, AdvisoryFade, DEFAULT_PITCH_LIMIT_DEGREES};
use super::animator::HeadingAnimator;
use crate::orientation::{OrientationEvent, OrientationListener};
use crate::render::SurfaceSize;
use crate::units::UnitOfMeasure;

/// Everything the HUD knows about the world.
#[derive(Debug, Clone)]
pub struct DisplayState {
    animator: HeadingAnimator,
    speed_mps: f32,
    unit: UnitOfMeasure,
    pitch: f32,
    pitch_limit: f32,
    pitch_too_steep: bool,
    magnetic_interference: bool,
    advisory: AdvisoryFade,
    surface_size: Option<SurfaceSize>,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self::new(UnitOfMeasure::default(), DEFAULT_PITCH_LIMIT_DEGREES)
    }
}

impl DisplayState {
    pub fn new(unit: UnitOfMeasure, pitch_limit: f32) -> Self {
        Self {
            animator: HeadingAnimator::new(),
            speed_mps: 0.0,
            unit,
            pitch: 0.0,
            pitch_limit,
            pitch_too_steep: false,
            magnetic_interference: false,
            advisory: AdvisoryFade::new(),
            surface_size: None,
        }
    }

    /// Fold one orientation event into the state.
    pub fn apply(&mut self, event: &OrientationEvent, now: Instant) {
        match *event {
            OrientationEvent::OrientationChanged { heading, pitch } => {
                self.pitch = pitch;
                self.pitch_too_steep = is_too_steep(pitch, self.pitch_limit);
                self.animator.observe(heading, now);
            }
            OrientationEvent::LocationChanged { speed_mps } => {
                self.speed_mps = if speed_mps.is_finite() {
                    speed_mps.max(0.0)
                } else {
                    0.0
                };
            }
            OrientationEvent::AccuracyChanged { has_interference } => {
                self.magnetic_interference = has_interference;
            }
        }
        self.advisory.set(
            Advisory::select(self.magnetic_interference, self.pitch_too_steep),
            now,
        );
    }

    /// Advance time-driven animations to `now`.
    pub fn tick(&mut self, now: Instant) {
        self.animator.advance(now);
        self.advisory.advance(now);
    }

    pub fn set_unit(&mut self, unit: UnitOfMeasure) {
        self.unit = unit;
    }

    pub fn unit(&self) -> UnitOfMeasure {
        self.unit
    }

    pub fn set_surface_size(&mut self, size: Option<SurfaceSize>) {
        self.surface_size = size;
    }

    pub fn surface_size(&self) -> Option<SurfaceSize> {
        self.surface_size
    }

    pub fn animator(&self) -> &HeadingAnimator {
        &self.animator
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn snapshot(&self) -> DisplaySnapshot {
        DisplaySnapshot {
            animated_heading: self.animator.animated(),
            raw_heading: self.animator.raw(),
            speed_mps: self.speed_mps,
            unit: self.unit,
            pitch_too_steep: self.pitch_too_steep,
            magnetic_interference: self.magnetic_interference,
            advisory: self.advisory.advisory(),
            advisory_text: self.advisory.text(),
            advisory_opacity: self.advisory.opacity(),
            surface_size: self.surface_size,
        }
    }
}

/// A consistent copy of the display state for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplaySnapshot {
    /// `None` until the first heading sample arrives.
    pub animated_heading: Option<f32>,
    pub raw_heading: f32,
    pub speed_mps: f32,
    pub unit: UnitOfMeasure,
    pub pitch_too_steep: bool,
    pub magnetic_interference: bool,
    pub advisory: Advisory,
    pub advisory_text: Option<&'static str>,
    pub advisory_opacity: f32,
    pub surface_size: Option<SurfaceSize>,
}

impl Default for DisplaySnapshot {
    fn default() -> Self {
        DisplayState::default().snapshot()
    }
}

/// Cloneable handle to the state shared by sensors and the render loop.
#[derive(Debug, Clone, Default)]
pub struct SharedDisplayState {
    inner: Arc<Mutex<DisplayState>>,
}

impl SharedDisplayState {
    pub fn new(state: DisplayState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    pub fn apply(&self, event: &OrientationEvent, now: Instant) {
        self.inner.lock().apply(event, now);
    }

    /// Advance animations to `now` and copy the result, under one lock.
    pub fn tick_and_snapshot(&self, now: Instant) -> DisplaySnapshot {
        let mut state = self.inner.lock();
        state.tick(now);
        state.snapshot()
    }

    pub fn snapshot(&self) -> DisplaySnapshot {
        self.inner.lock().snapshot()
    }

    pub fn set_unit(&self, unit: UnitOfMeasure) {
        self.inner.lock().set_unit(unit);
    }

    pub fn unit(&self) -> UnitOfMeasure {
        self.inner.lock().unit()
    }

    pub fn set_surface_size(&self, size: Option<SurfaceSize>) {
        self.inner.lock().set_surface_size(size);
    }

    /// Run `f` with exclusive access to the state.
    pub fn with<R>(&self, f: impl FnOnce(&mut DisplayState) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl OrientationListener for SharedDisplayState {
    fn on_event(&self, event: &OrientationEvent) {
        self.apply(event, Instant::now());
    }
}
