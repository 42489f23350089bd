//! Scripted orientation source.
//!
//! Produces a repeatable motion pattern for demos without a simulator: a
//! slow clockwise sweep, periodic large heading jumps that exercise the
//! animator, pitch excursions past the steep limit and bursts of magnetic
//! interference.

use std::f32::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::{ListenerSet, OrientationError, OrientationEvent, OrientationListener, OrientationSource};
use crate::angle::normalize;

/// One sample of the scripted motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedSample {
    pub heading: f32,
    pub pitch: f32,
    pub speed_mps: f32,
    pub has_interference: bool,
}

/// Timing of the scripted motion. All periods are in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationScript {
    /// Interval between emitted samples.
    pub tick: Duration,
    /// Sweep rate in degrees per second.
    pub sweep_rate: f32,
    /// Heading offset applied during the second half of each jump period.
    pub jump_degrees: f32,
    pub jump_period: f32,
    /// Pitch shown during a steep window.
    pub steep_pitch: f32,
    pub steep_period: f32,
    pub steep_window: f32,
    pub interference_period: f32,
    pub interference_window: f32,
    /// Speed oscillates between `base - swing` and `base + swing`.
    pub speed_base: f32,
    pub speed_swing: f32,
    pub speed_period: f32,
}

impl Default for SimulationScript {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(50),
            sweep_rate: 6.0,
            jump_degrees: 120.0,
            jump_period: 20.0,
            steep_pitch: 80.0,
            steep_period: 30.0,
            steep_window: 3.0,
            interference_period: 45.0,
            interference_window: 5.0,
            speed_base: 12.0,
            speed_swing: 8.0,
            speed_period: 60.0,
        }
    }
}

impl SimulationScript {
    /// Sample the motion `elapsed` after the script started.
    pub fn sample(&self, elapsed: Duration) -> SimulatedSample {
        let t = elapsed.as_secs_f32();

        let jump = if phase(t, self.jump_period) >= self.jump_period / 2.0 {
            self.jump_degrees
        } else {
            0.0
        };
        let heading = normalize(t * self.sweep_rate + jump);

        // Steep and interference windows sit at the end of their periods
        let pitch = if phase(t, self.steep_period) >= self.steep_period - self.steep_window {
            self.steep_pitch
        } else {
            0.0
        };
        let has_interference = phase(t, self.interference_period)
            >= self.interference_period - self.interference_window;

        let speed_mps = if self.speed_period > 0.0 {
            self.speed_base + self.speed_swing * (TAU * t / self.speed_period).sin()
        } else {
            self.speed_base
        };

        SimulatedSample {
            heading,
            pitch,
            speed_mps: speed_mps.max(0.0),
            has_interference,
        }
    }
}

fn phase(t: f32, period: f32) -> f32 {
    if period > 0.0 {
        t.rem_euclid(period)
    } else {
        0.0
    }
}

/// Orientation source driven by a [`SimulationScript`] on its own thread.
pub struct SimulatedOrientationSource {
    script: SimulationScript,
    listeners: ListenerSet,
    shutdown: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

impl Default for SimulatedOrientationSource {
    fn default() -> Self {
        Self::new(SimulationScript::default())
    }
}

impl SimulatedOrientationSource {
    pub fn new(script: SimulationScript) -> Self {
        Self {
            script,
            listeners: ListenerSet::new(),
            shutdown: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
        }
    }

    pub fn script(&self) -> &SimulationScript {
        &self.script
    }

    fn run_loop(script: SimulationScript, listeners: ListenerSet, shutdown: Arc<AtomicBool>) {
        let started = Instant::now();
        let mut last_interference = None;
        let mut samples: u64 = 0;

        while !shutdown.load(Ordering::Acquire) {
            let tick_start = Instant::now();
            let sample = script.sample(tick_start - started);

            listeners.dispatch(&OrientationEvent::OrientationChanged {
                heading: sample.heading,
                pitch: sample.pitch,
            });
            listeners.dispatch(&OrientationEvent::LocationChanged {
                speed_mps: sample.speed_mps,
            });
            if last_interference != Some(sample.has_interference) {
                listeners.dispatch(&OrientationEvent::AccuracyChanged {
                    has_interference: sample.has_interference,
                });
                last_interference = Some(sample.has_interference);
            }
            samples += 1;

            let deadline = tick_start + script.tick;
            loop {
                if shutdown.load(Ordering::Acquire) {
                    break;
                }
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                thread::park_timeout(deadline - now);
            }
        }

        debug!(samples, "Simulated orientation source stopped");
    }
}

impl OrientationSource for SimulatedOrientationSource {
    fn add_listener(&self, listener: Arc<dyn OrientationListener>) {
        self.listeners.add(listener);
    }

    fn remove_listener(&self, listener: &Arc<dyn OrientationListener>) {
        self.listeners.remove(listener);
    }

    fn start(&mut self) -> Result<(), OrientationError> {
        if self.thread_handle.is_some() {
            return Ok(());
        }

        self.shutdown.store(false, Ordering::Release);
        let script = self.script.clone();
        let listeners = self.listeners.clone();
        let shutdown = self.shutdown.clone();

        let handle = thread::Builder::new()
            .name("speedhud-sim".to_string())
            .spawn(move || Self::run_loop(script, listeners, shutdown))
            .map_err(OrientationError::Spawn)?;

        info!(
            tick_ms = self.script.tick.as_millis() as u64,
            "Simulated orientation source started"
        );
        self.thread_handle = Some(handle);
        Ok(())
    }

    fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(handle) = self.thread_handle.take() {
            handle.thread().unpark();
            if let Err(e) = handle.join() {
                warn!("Simulated source thread panicked: {:?}", e);
            }
        }
    }

    fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for SimulatedOrientationSource {
    fn drop(&mut self) {
        self.stop();
    }
}
