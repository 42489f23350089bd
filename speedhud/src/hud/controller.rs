//! Host-facing HUD controller.
//!
//! [`SpeedHud`] pairs an orientation source with the render loop and maps
//! the host's surface callbacks onto them:
//!
//! - `on_surface_created`: register listener, start source, start render loop
//! - `on_surface_changed`: lay out later frames at the new surface size
//! - `on_surface_destroyed`: stop source, unregister, stop and join the loop
//!
//! Sensor listening therefore only happens while a surface exists, and the
//! render thread has fully exited before the surface is handed back.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::state::{DisplaySnapshot, DisplayState, SharedDisplayState};
use crate::angle::{direction_name, normalize};
use crate::orientation::{OrientationError, OrientationListener, OrientationSource};
use crate::render::{Canvas, CompassRenderer, RenderError, SurfaceSize};
use crate::scheduler::{
    FramePainter, FrameScheduler, FrameSchedulerConfig, FrameStatsSnapshot, SchedulerError,
};
use crate::surface::Surface;
use crate::units::UnitOfMeasure;

/// Errors from the surface lifecycle calls.
#[derive(Debug, Error)]
pub enum HudError {
    #[error(transparent)]
    Orientation(#[from] OrientationError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

/// Frame painter that advances the shared state and renders it.
#[derive(Debug, Clone)]
pub struct HudPainter {
    state: SharedDisplayState,
    renderer: CompassRenderer,
}

impl HudPainter {
    pub fn new(state: SharedDisplayState) -> Self {
        Self {
            state,
            renderer: CompassRenderer::new(),
        }
    }
}

impl FramePainter for HudPainter {
    fn paint(&self, canvas: &mut dyn Canvas, frame_start: Instant) -> Result<(), RenderError> {
        let snapshot = self.state.tick_and_snapshot(frame_start);
        self.renderer.render(canvas, &snapshot)
    }
}

/// The speed and heading HUD.
pub struct SpeedHud<O: OrientationSource, S: Surface + 'static> {
    source: O,
    state: SharedDisplayState,
    listener: Arc<dyn OrientationListener>,
    painter: Arc<HudPainter>,
    scheduler_config: FrameSchedulerConfig,
    scheduler: Option<FrameScheduler<S>>,
}

impl<O: OrientationSource, S: Surface + 'static> SpeedHud<O, S> {
    pub fn new(source: O, state: DisplayState, scheduler_config: FrameSchedulerConfig) -> Self {
        let state = SharedDisplayState::new(state);
        Self {
            source,
            listener: Arc::new(state.clone()),
            painter: Arc::new(HudPainter::new(state.clone())),
            state,
            scheduler_config,
            scheduler: None,
        }
    }

    pub fn set_unit_of_measure(&self, unit: UnitOfMeasure) {
        self.state.set_unit(unit);
        debug!(unit = %unit, "Unit of measure changed");
    }

    pub fn unit_of_measure(&self) -> UnitOfMeasure {
        self.state.unit()
    }

    /// Start listening and rendering onto `surface`.
    ///
    /// A surface that is already active is torn down first. On error nothing
    /// is left running.
    pub fn on_surface_created(&mut self, surface: S) -> Result<(), HudError> {
        if self.scheduler.is_some() {
            warn!("Surface created while another is active, replacing it");
            self.on_surface_destroyed();
        }

        self.source.add_listener(self.listener.clone());
        if let Err(e) = self.source.start() {
            self.source.remove_listener(&self.listener);
            return Err(e.into());
        }

        let painter: Arc<dyn FramePainter> = self.painter.clone();
        match FrameScheduler::start(surface, painter, self.scheduler_config.clone()) {
            Ok(scheduler) => {
                self.scheduler = Some(scheduler);
                info!("HUD surface created");
                Ok(())
            }
            Err(e) => {
                self.source.stop();
                self.source.remove_listener(&self.listener);
                Err(e.into())
            }
        }
    }

    pub fn on_surface_changed(&self, width: u32, height: u32) {
        self.state
            .set_surface_size(Some(SurfaceSize::new(width, height)));
        debug!(width, height, "HUD surface changed");
    }

    /// Stop listening and rendering, and hand the surface back.
    ///
    /// Returns `None` if no surface was active or the render thread
    /// panicked.
    pub fn on_surface_destroyed(&mut self) -> Option<S> {
        self.source.stop();
        self.source.remove_listener(&self.listener);

        let scheduler = self.scheduler.take()?;
        let stats = scheduler.stats();
        let surface = scheduler.stop();
        self.state.set_surface_size(None);

        info!(
            frames = stats.frames,
            presented = stats.presented,
            "HUD surface destroyed"
        );
        surface
    }

    pub fn is_active(&self) -> bool {
        self.scheduler.is_some()
    }

    pub fn snapshot(&self) -> DisplaySnapshot {
        self.state.snapshot()
    }

    /// Frame counters of the active render loop.
    pub fn frame_stats(&self) -> Option<FrameStatsSnapshot> {
        self.scheduler.as_ref().map(|s| s.stats())
    }

    /// Heading as text, e.g. `"135° SE"`. `None` before the first sample.
    pub fn heading_readout(&self) -> Option<String> {
        self.snapshot().animated_heading.map(format_heading)
    }

    /// Handle to the shared display state.
    pub fn state(&self) -> &SharedDisplayState {
        &self.state
    }

    pub fn source(&self) -> &O {
        &self.source
    }
}

impl<O: OrientationSource, S: Surface + 'static> Drop for SpeedHud<O, S> {
    fn drop(&mut self) {
        if self.scheduler.is_some() || self.source.is_running() {
            self.on_surface_destroyed();
        }
    }
}

/// Format a heading as whole degrees plus its half-wind name.
pub fn format_heading(heading: f32) -> String {
    let degrees = normalize(heading).round() as u32 % 360;
    format!("{:03}° {}", degrees, direction_name(heading))
}
