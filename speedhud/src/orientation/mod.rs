//! Orientation sources.
//!
//! A source produces heading, pitch, speed and accuracy updates and pushes
//! them to registered listeners. The HUD never pulls from a source; it only
//! reacts to events, and a listener must return quickly since it runs on
//! the source's own thread or task.
//!
//! # Sources
//!
//! - [`XPlaneOrientationSource`] - X-Plane UDP telemetry (ForeFlight and
//!   legacy DATA protocols)
//! - [`SimulatedOrientationSource`] - scripted motion for demos and tests

pub mod simulated;
pub mod xplane;

pub use simulated::{SimulatedOrientationSource, SimulationScript};
pub use xplane::{XPlaneOrientationSource, XPlaneSourceConfig, DEFAULT_TELEMETRY_PORT};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

/// A change reported by an orientation source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrientationEvent {
    /// Heading and pitch in degrees.
    OrientationChanged { heading: f32, pitch: f32 },
    /// Ground speed in meters per second.
    LocationChanged { speed_mps: f32 },
    /// Whether the heading is currently disturbed by magnetic interference.
    AccuracyChanged { has_interference: bool },
}

/// Receives orientation events.
pub trait OrientationListener: Send + Sync {
    fn on_event(&self, event: &OrientationEvent);
}

/// Errors starting an orientation source.
#[derive(Debug, Error)]
pub enum OrientationError {
    #[error("Failed to bind UDP socket on port {port}: {source}")]
    SocketBind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start orientation source: {0}")]
    Spawn(#[source] std::io::Error),
}

/// A producer of orientation events.
///
/// Events are delivered only between [`start`](Self::start) and
/// [`stop`](Self::stop). Both are idempotent.
pub trait OrientationSource: Send {
    fn add_listener(&self, listener: Arc<dyn OrientationListener>);

    /// Remove a listener previously added. Compared by identity.
    fn remove_listener(&self, listener: &Arc<dyn OrientationListener>);

    fn start(&mut self) -> Result<(), OrientationError>;

    fn stop(&mut self);

    fn is_running(&self) -> bool;
}

/// Thread-safe listener registry shared between a source and its worker.
#[derive(Clone, Default)]
pub struct ListenerSet {
    listeners: Arc<RwLock<Vec<Arc<dyn OrientationListener>>>>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener. Adding the same listener twice has no effect.
    pub fn add(&self, listener: Arc<dyn OrientationListener>) {
        let mut listeners = self.listeners.write();
        if !listeners.iter().any(|l| Arc::ptr_eq(l, &listener)) {
            listeners.push(listener);
        }
    }

    pub fn remove(&self, listener: &Arc<dyn OrientationListener>) {
        self.listeners.write().retain(|l| !Arc::ptr_eq(l, listener));
    }

    /// Deliver `event` to every listener.
    pub fn dispatch(&self, event: &OrientationEvent) {
        for listener in self.listeners.read().iter() {
            listener.on_event(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }
}

impl fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSet")
            .field("listeners", &self.len())
            .finish()
    }
}

/// Which orientation source the host wires up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    #[default]
    XPlane,
    Simulated,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::XPlane => f.write_str("xplane"),
            SourceKind::Simulated => f.write_str("simulated"),
        }
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "xplane" | "x-plane" => Ok(SourceKind::XPlane),
            "simulated" | "sim" => Ok(SourceKind::Simulated),
            other => Err(format!(
                "unknown source '{}' (expected xplane or simulated)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Collector {
        events: Mutex<Vec<OrientationEvent>>,
    }

    impl OrientationListener for Collector {
        fn on_event(&self, event: &OrientationEvent) {
            self.events.lock().push(*event);
        }
    }

    #[test]
    fn test_dispatch_reaches_all_listeners() {
        let set = ListenerSet::new();
        let a = Arc::new(Collector::default());
        let b = Arc::new(Collector::default());
        set.add(a.clone());
        set.add(b.clone());

        set.dispatch(&OrientationEvent::LocationChanged { speed_mps: 1.0 });

        assert_eq!(a.events.lock().len(), 1);
        assert_eq!(b.events.lock().len(), 1);
    }

    #[test]
    fn test_add_is_idempotent() {
        let set = ListenerSet::new();
        let a: Arc<dyn OrientationListener> = Arc::new(Collector::default());
        set.add(a.clone());
        set.add(a.clone());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_remove_by_identity() {
        let set = ListenerSet::new();
        let a: Arc<dyn OrientationListener> = Arc::new(Collector::default());
        let b: Arc<dyn OrientationListener> = Arc::new(Collector::default());
        set.add(a.clone());
        set.add(b.clone());

        set.remove(&a);
        assert_eq!(set.len(), 1);
        set.remove(&a);
        assert_eq!(set.len(), 1);
        set.remove(&b);
        assert!(set.is_empty());
    }

    #[test]
    fn test_clones_share_registry() {
        let set = ListenerSet::new();
        let worker_view = set.clone();
        set.add(Arc::new(Collector::default()));
        assert_eq!(worker_view.len(), 1);
    }

    #[test]
    fn test_source_kind_parse() {
        assert_eq!("xplane".parse(), Ok(SourceKind::XPlane));
        assert_eq!("Simulated".parse(), Ok(SourceKind::Simulated));
        assert!("gps".parse::<SourceKind>().is_err());
        assert_eq!(SourceKind::default().to_string(), "xplane");
    }
}
