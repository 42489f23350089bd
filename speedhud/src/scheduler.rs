//! Fixed-rate render loop.
//!
//! The scheduler owns a surface on a dedicated thread and repaints it once
//! per frame budget, independently of how often sensor events arrive. Each
//! iteration:
//!
//! 1. records the frame start time
//! 2. acquires, draws and posts the surface through [`draw_frame`]
//! 3. sleeps for whatever is left of the frame budget
//!
//! Overrunning frames are followed immediately by the next one; there is
//! no catch-up. The loop only exits on the cooperative stop flag, which is
//! checked before every frame and while sleeping.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::render::{Canvas, RenderError};
use crate::surface::{draw_frame, FrameOutcome, Surface};

/// Nominal frame rate.
pub const DEFAULT_FPS: u32 = 45;

/// Paints one frame. Called from the render thread.
pub trait FramePainter: Send + Sync + 'static {
    /// Draw onto `canvas`. `frame_start` is the time the frame began and
    /// should drive any time-based animation.
    fn paint(&self, canvas: &mut dyn Canvas, frame_start: Instant) -> Result<(), RenderError>;
}

impl<F> FramePainter for F
where
    F: Fn(&mut dyn Canvas, Instant) -> Result<(), RenderError> + Send + Sync + 'static,
{
    fn paint(&self, canvas: &mut dyn Canvas, frame_start: Instant) -> Result<(), RenderError> {
        self(canvas, frame_start)
    }
}

/// Errors starting the render loop.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("failed to spawn render thread: {0}")]
    Spawn(#[source] io::Error),
}

/// Render loop settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSchedulerConfig {
    /// Wall-clock time allotted to each frame.
    pub frame_budget: Duration,
    /// Name of the render thread.
    pub thread_name: String,
}

impl Default for FrameSchedulerConfig {
    fn default() -> Self {
        Self::from_fps(DEFAULT_FPS)
    }
}

impl FrameSchedulerConfig {
    /// Budget of `1000 / fps` whole milliseconds (22 ms at 45 fps).
    ///
    /// An fps of 0 falls back to [`DEFAULT_FPS`]. The budget never drops
    /// below 1 ms.
    pub fn from_fps(fps: u32) -> Self {
        let fps = if fps == 0 { DEFAULT_FPS } else { fps };
        let millis = (1000 / fps).max(1) as u64;
        Self {
            frame_budget: Duration::from_millis(millis),
            thread_name: "speedhud-render".to_string(),
        }
    }

    pub fn with_frame_budget(mut self, budget: Duration) -> Self {
        self.frame_budget = budget.max(Duration::from_millis(1));
        self
    }
}

/// Frame counters shared with the render thread.
#[derive(Debug, Default)]
pub struct FrameStats {
    frames: AtomicU64,
    presented: AtomicU64,
    skipped: AtomicU64,
    draw_failed: AtomicU64,
    post_failed: AtomicU64,
}

/// Point-in-time copy of [`FrameStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStatsSnapshot {
    pub frames: u64,
    pub presented: u64,
    pub skipped: u64,
    pub draw_failed: u64,
    pub post_failed: u64,
}

impl FrameStats {
    pub fn record(&self, outcome: &FrameOutcome) {
        self.frames.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            FrameOutcome::Presented => &self.presented,
            FrameOutcome::Skipped(_) => &self.skipped,
            FrameOutcome::DrawFailed(_) => &self.draw_failed,
            FrameOutcome::PostFailed(_) => &self.post_failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> FrameStatsSnapshot {
        FrameStatsSnapshot {
            frames: self.frames.load(Ordering::Relaxed),
            presented: self.presented.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            draw_failed: self.draw_failed.load(Ordering::Relaxed),
            post_failed: self.post_failed.load(Ordering::Relaxed),
        }
    }
}

/// Handle to a running render loop.
///
/// Dropping the handle stops the loop and waits for it, discarding the
/// surface. Use [`shutdown`](Self::shutdown) and [`join`](Self::join) to get
/// the surface back.
pub struct FrameScheduler<S: Surface + 'static> {
    thread_handle: Option<JoinHandle<S>>,
    shutdown: Arc<AtomicBool>,
    stats: Arc<FrameStats>,
    frame_budget: Duration,
}

impl<S: Surface + 'static> FrameScheduler<S> {
    /// Move `surface` onto a new render thread and start painting.
    pub fn start(
        surface: S,
        painter: Arc<dyn FramePainter>,
        config: FrameSchedulerConfig,
    ) -> Result<Self, SchedulerError> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(FrameStats::default());
        let frame_budget = config.frame_budget;

        let shutdown_clone = shutdown.clone();
        let stats_clone = stats.clone();

        let thread_handle = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || {
                Self::run_loop(surface, painter, frame_budget, shutdown_clone, stats_clone)
            })
            .map_err(SchedulerError::Spawn)?;

        info!(
            budget_ms = frame_budget.as_millis() as u64,
            thread = %config.thread_name,
            "Render loop started"
        );

        Ok(Self {
            thread_handle: Some(thread_handle),
            shutdown,
            stats,
            frame_budget,
        })
    }

    fn run_loop(
        mut surface: S,
        painter: Arc<dyn FramePainter>,
        frame_budget: Duration,
        shutdown: Arc<AtomicBool>,
        stats: Arc<FrameStats>,
    ) -> S {
        let mut last_kind = "presented";

        while !shutdown.load(Ordering::Acquire) {
            let frame_start = Instant::now();

            let outcome = draw_frame(&mut surface, |canvas| painter.paint(canvas, frame_start));
            stats.record(&outcome);

            // Log transitions only, a persistent failure would otherwise
            // produce one line per frame
            if outcome.kind() != last_kind {
                match &outcome {
                    FrameOutcome::Presented => debug!(previous = last_kind, "Frames presenting again"),
                    FrameOutcome::Skipped(e) => debug!(error = %e, "Surface unavailable, skipping frames"),
                    FrameOutcome::DrawFailed(e) => warn!(error = %e, "Frame draw failed"),
                    FrameOutcome::PostFailed(e) => debug!(error = %e, "Frame post failed"),
                }
                last_kind = outcome.kind();
            }

            Self::sleep_until(frame_start + frame_budget, &shutdown);
        }

        let totals = stats.snapshot();
        debug!(
            frames = totals.frames,
            presented = totals.presented,
            skipped = totals.skipped,
            draw_failed = totals.draw_failed,
            post_failed = totals.post_failed,
            "Render loop stopped"
        );
        surface
    }

    /// Park until `deadline` or until a stop is requested.
    fn sleep_until(deadline: Instant, shutdown: &AtomicBool) {
        loop {
            if shutdown.load(Ordering::Acquire) {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                return;
            }
            thread::park_timeout(deadline - now);
        }
    }

    /// Request the loop to stop after the current frame. Non-blocking.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(handle) = &self.thread_handle {
            handle.thread().unpark();
        }
    }

    /// Wait for the render thread to exit and take back the surface.
    ///
    /// Returns `None` if already joined or if the render thread panicked.
    pub fn join(&mut self) -> Option<S> {
        let handle = self.thread_handle.take()?;
        match handle.join() {
            Ok(surface) => Some(surface),
            Err(e) => {
                warn!("Render thread panicked: {:?}", e);
                None
            }
        }
    }

    /// Stop the loop and wait for it.
    pub fn stop(mut self) -> Option<S> {
        self.shutdown();
        self.join()
    }

    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    pub fn stats(&self) -> FrameStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn frame_budget(&self) -> Duration {
        self.frame_budget
    }
}

impl<S: Surface + 'static> Drop for FrameScheduler<S> {
    fn drop(&mut self) {
        self.shutdown();
        self.join();
    }
}
