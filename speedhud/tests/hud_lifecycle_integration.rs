//! Integration tests for the HUD surface lifecycle.
//!
//! These tests wire a [`SpeedHud`] to orientation sources and a capturing
//! surface and verify:
//! - Sensor listening is paired with surface lifetime
//! - Frames reflect sensor events, unit changes and advisories
//! - The surface is handed back after the render loop has exited
//!
//! Run with: `cargo test --test hud_lifecycle_integration`

use std::net::{IpAddr, Ipv4Addr, UdpSocket};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use speedhud::hud::{DisplayState, SpeedHud};
use speedhud::orientation::{
    ListenerSet, OrientationError, OrientationEvent, OrientationListener, OrientationSource,
    SimulatedOrientationSource, SimulationScript, XPlaneOrientationSource, XPlaneSourceConfig,
};
use speedhud::render::{DrawCommand, RecordingCanvas};
use speedhud::scheduler::FrameSchedulerConfig;
use speedhud::surface::{Surface, SurfaceError};
use speedhud::units::UnitOfMeasure;

// ============================================================================
// Test Helpers
// ============================================================================

/// Surface that keeps the display list of the most recent frame.
struct CapturingSurface {
    last_frame: Arc<Mutex<Vec<DrawCommand>>>,
}

impl CapturingSurface {
    fn new() -> (Self, Arc<Mutex<Vec<DrawCommand>>>) {
        let last_frame = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                last_frame: last_frame.clone(),
            },
            last_frame,
        )
    }
}

impl Surface for CapturingSurface {
    type Canvas = RecordingCanvas;

    fn lock_canvas(&mut self) -> Result<RecordingCanvas, SurfaceError> {
        Ok(RecordingCanvas::new(640, 360))
    }

    fn unlock_canvas_and_post(&mut self, mut canvas: RecordingCanvas) -> Result<(), SurfaceError> {
        *self.last_frame.lock() = canvas.take_commands();
        Ok(())
    }
}

/// Source the test pushes events through by hand.
#[derive(Default)]
struct ManualSource {
    listeners: ListenerSet,
    running: bool,
}

impl ManualSource {
    fn emit(&self, event: OrientationEvent) {
        if self.running {
            self.listeners.dispatch(&event);
        }
    }
}

impl OrientationSource for ManualSource {
    fn add_listener(&self, listener: Arc<dyn OrientationListener>) {
        self.listeners.add(listener);
    }

    fn remove_listener(&self, listener: &Arc<dyn OrientationListener>) {
        self.listeners.remove(listener);
    }

    fn start(&mut self) -> Result<(), OrientationError> {
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

fn frame_texts(frame: &Arc<Mutex<Vec<DrawCommand>>>) -> Vec<String> {
    frame
        .lock()
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

/// Poll until `predicate` holds for the latest frame or the timeout passes.
fn wait_for_frame(
    frame: &Arc<Mutex<Vec<DrawCommand>>>,
    predicate: impl Fn(&[String]) -> bool,
) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if predicate(&frame_texts(frame)) {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

fn fast_config() -> FrameSchedulerConfig {
    FrameSchedulerConfig::from_fps(100)
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_frames_follow_manual_events() {
    let mut hud: SpeedHud<ManualSource, CapturingSurface> =
        SpeedHud::new(ManualSource::default(), DisplayState::default(), fast_config());
    let (surface, frame) = CapturingSurface::new();
    hud.on_surface_created(surface).unwrap();

    hud.source().emit(OrientationEvent::OrientationChanged {
        heading: 90.0,
        pitch: 0.0,
    });
    hud.source()
        .emit(OrientationEvent::LocationChanged { speed_mps: 10.0 });
    hud.set_unit_of_measure(UnitOfMeasure::KilometersPerHour);

    assert!(wait_for_frame(&frame, |texts| {
        texts.iter().any(|t| t == "E")
            && texts.iter().any(|t| t == "36")
            && texts.iter().any(|t| t == "km/h")
    }));

    hud.set_unit_of_measure(UnitOfMeasure::Knots);
    assert!(wait_for_frame(&frame, |texts| {
        texts.iter().any(|t| t == "19") && texts.iter().any(|t| t == "kt")
    }));

    assert!(hud.on_surface_destroyed().is_some());
}

#[test]
fn test_advisory_priority_in_frames() {
    let mut hud: SpeedHud<ManualSource, CapturingSurface> =
        SpeedHud::new(ManualSource::default(), DisplayState::default(), fast_config());
    let (surface, frame) = CapturingSurface::new();
    hud.on_surface_created(surface).unwrap();

    hud.source().emit(OrientationEvent::OrientationChanged {
        heading: 0.0,
        pitch: 80.0,
    });
    assert!(wait_for_frame(&frame, |texts| {
        texts.iter().any(|t| t == "Pitch too steep")
    }));

    // Interference outranks steep pitch
    hud.source().emit(OrientationEvent::AccuracyChanged {
        has_interference: true,
    });
    assert!(wait_for_frame(&frame, |texts| {
        texts.iter().any(|t| t == "Magnetic interference")
            && !texts.iter().any(|t| t == "Pitch too steep")
    }));

    // Once both clear, the message fades out and disappears
    hud.source().emit(OrientationEvent::AccuracyChanged {
        has_interference: false,
    });
    hud.source().emit(OrientationEvent::OrientationChanged {
        heading: 0.0,
        pitch: 0.0,
    });
    assert!(wait_for_frame(&frame, |texts| {
        !texts.iter().any(|t| t == "Magnetic interference" || t == "Pitch too steep")
    }));

    hud.on_surface_destroyed();
}

#[test]
fn test_no_events_after_surface_destroyed() {
    let mut hud: SpeedHud<ManualSource, CapturingSurface> =
        SpeedHud::new(ManualSource::default(), DisplayState::default(), fast_config());
    let (surface, _frame) = CapturingSurface::new();
    hud.on_surface_created(surface).unwrap();
    hud.source().emit(OrientationEvent::OrientationChanged {
        heading: 45.0,
        pitch: 0.0,
    });
    hud.on_surface_destroyed();

    assert!(!hud.source().is_running());
    assert!(hud.source().listeners.is_empty());
    hud.source().emit(OrientationEvent::OrientationChanged {
        heading: 200.0,
        pitch: 0.0,
    });
    assert_eq!(hud.snapshot().raw_heading, 45.0);
}

#[test]
fn test_surface_can_be_recreated() {
    let mut hud: SpeedHud<ManualSource, CapturingSurface> =
        SpeedHud::new(ManualSource::default(), DisplayState::default(), fast_config());

    for _ in 0..3 {
        let (surface, frame) = CapturingSurface::new();
        hud.on_surface_created(surface).unwrap();
        hud.on_surface_changed(640, 360);
        assert!(wait_for_frame(&frame, |texts| !texts.is_empty()));
        assert!(hud.on_surface_destroyed().is_some());
        assert!(!hud.is_active());
    }
}

#[test]
fn test_xplane_surface_can_be_recreated_on_same_port() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap();
    let port = UdpSocket::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let config = XPlaneSourceConfig::default()
        .with_bind_address(IpAddr::V4(Ipv4Addr::LOCALHOST))
        .with_port(port);
    let mut hud: SpeedHud<XPlaneOrientationSource, CapturingSurface> = SpeedHud::new(
        XPlaneOrientationSource::new(config, runtime.handle().clone()),
        DisplayState::default(),
        fast_config(),
    );
    let sender = UdpSocket::bind("127.0.0.1:0").unwrap();

    for cycle in 0..5 {
        let (surface, _frame) = CapturingSurface::new();
        hud.on_surface_created(surface).unwrap();

        let heading = 10.0 + cycle as f32 * 30.0;
        let packet = format!("XATT2X-Plane,{:.1},0.0,0.0", heading);
        sender.send_to(packet.as_bytes(), ("127.0.0.1", port)).unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        while hud.snapshot().raw_heading != heading && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(hud.snapshot().raw_heading, heading);

        assert!(hud.on_surface_destroyed().is_some());
        assert!(!hud.source().is_running());
    }
}

#[test]
fn test_simulated_source_drives_hud() {
    let script = SimulationScript {
        tick: Duration::from_millis(5),
        ..Default::default()
    };
    let mut hud: SpeedHud<SimulatedOrientationSource, CapturingSurface> = SpeedHud::new(
        SimulatedOrientationSource::new(script),
        DisplayState::default(),
        fast_config(),
    );
    let (surface, frame) = CapturingSurface::new();
    hud.on_surface_created(surface).unwrap();
    assert!(hud.source().is_running());

    // Direction labels only appear once a heading has arrived
    assert!(wait_for_frame(&frame, |texts| texts.iter().any(|t| t == "N")));
    assert!(hud.heading_readout().is_some());

    hud.on_surface_destroyed();
    assert!(!hud.source().is_running());
}
