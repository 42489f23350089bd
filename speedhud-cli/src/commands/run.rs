//! Run command - show the HUD.
//!
//! With a terminal on stdout the full HUD is drawn; otherwise (or with
//! `--headless`) a status line is printed every two seconds. Either way the
//! unit of measure in effect at exit is written back to the config file.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use speedhud::config::ConfigFile;
use speedhud::hud::{format_heading, DisplaySnapshot, DisplayState, SharedDisplayState, SpeedHud};
use speedhud::orientation::{
    OrientationListener, OrientationSource, SimulatedOrientationSource, SourceKind,
    XPlaneOrientationSource, XPlaneSourceConfig,
};
use speedhud::render::format_speed;
use speedhud::scheduler::FrameSchedulerConfig;
use speedhud::units::UnitOfMeasure;

use crate::error::CliError;
use crate::runner::CliRunner;
use crate::ui::{self, TerminalSurface};

/// Interval between headless status lines.
const STATUS_INTERVAL: Duration = Duration::from_secs(2);

/// Granularity of the headless shutdown check.
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

/// Arguments for the run command.
#[derive(Debug, Default)]
pub struct RunArgs {
    pub source: Option<SourceKind>,
    pub port: Option<u16>,
    pub unit: Option<UnitOfMeasure>,
    pub fps: Option<u32>,
    pub debug: bool,
    pub headless: bool,
}

/// Settings after applying command-line overrides to the config file.
#[derive(Debug, Clone, PartialEq)]
struct RunSettings {
    source: SourceKind,
    port: u16,
    unit: UnitOfMeasure,
    fps: u32,
    pitch_limit: f32,
}

impl RunSettings {
    fn resolve(config: &ConfigFile, args: &RunArgs) -> Self {
        Self {
            source: args.source.unwrap_or(config.telemetry.source),
            port: args.port.unwrap_or(config.telemetry.port),
            unit: args.unit.unwrap_or(config.display.unit),
            fps: args.fps.unwrap_or(config.display.fps),
            pitch_limit: config.display.pitch_limit,
        }
    }
}

/// Run the run command.
pub fn run(args: RunArgs) -> Result<(), CliError> {
    let runner = CliRunner::with_debug(args.debug)?;
    runner.log_startup("run");

    let settings = RunSettings::resolve(runner.config(), &args);
    let headless = args.headless || !atty::is(atty::Stream::Stdout);
    info!(
        source = %settings.source,
        port = settings.port,
        unit = %settings.unit,
        fps = settings.fps,
        headless,
        "Starting HUD"
    );

    // Set up signal handler for graceful shutdown
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    ctrlc::set_handler(move || {
        shutdown_clone.store(true, Ordering::SeqCst);
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let final_unit = match settings.source {
        SourceKind::XPlane => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .thread_name("speedhud-telemetry")
                .enable_all()
                .build()
                .map_err(CliError::Runtime)?;
            let source = XPlaneOrientationSource::new(
                XPlaneSourceConfig::default().with_port(settings.port),
                runtime.handle().clone(),
            );
            if headless {
                println!("Listening for X-Plane telemetry on UDP port {}", settings.port);
            }
            run_with_source(source, &settings, headless, &shutdown)?
        }
        SourceKind::Simulated => {
            run_with_source(SimulatedOrientationSource::default(), &settings, headless, &shutdown)?
        }
    };

    persist_unit(final_unit);
    info!("SpeedHUD stopped");
    Ok(())
}

/// Show the HUD fed by `source`, returning the unit in effect at exit.
fn run_with_source<O: OrientationSource>(
    source: O,
    settings: &RunSettings,
    headless: bool,
    shutdown: &AtomicBool,
) -> Result<UnitOfMeasure, CliError> {
    if headless {
        run_headless(source, settings, shutdown)
    } else {
        run_terminal(source, settings, shutdown)
    }
}

fn run_terminal<O: OrientationSource>(
    source: O,
    settings: &RunSettings,
    shutdown: &AtomicBool,
) -> Result<UnitOfMeasure, CliError> {
    ui::install_panic_hook();

    let surface = TerminalSurface::new().map_err(CliError::Terminal)?;
    let size = surface.size().map_err(CliError::Terminal)?;

    let mut hud: SpeedHud<O, TerminalSurface> = SpeedHud::new(
        source,
        DisplayState::new(settings.unit, settings.pitch_limit),
        FrameSchedulerConfig::from_fps(settings.fps),
    );
    hud.on_surface_created(surface)?;
    hud.on_surface_changed(size.width, size.height);

    let result = ui::run_event_loop(&hud, shutdown);

    // Dropping the returned surface restores the terminal
    if let Some(stats) = hud.frame_stats() {
        info!(
            frames = stats.frames,
            presented = stats.presented,
            skipped = stats.skipped,
            draw_failed = stats.draw_failed,
            "Render statistics"
        );
    }
    drop(hud.on_surface_destroyed());

    result.map_err(CliError::Terminal)?;
    Ok(hud.unit_of_measure())
}

fn run_headless<O: OrientationSource>(
    mut source: O,
    settings: &RunSettings,
    shutdown: &AtomicBool,
) -> Result<UnitOfMeasure, CliError> {
    let state = SharedDisplayState::new(DisplayState::new(settings.unit, settings.pitch_limit));
    let listener: Arc<dyn OrientationListener> = Arc::new(state.clone());

    source.add_listener(listener.clone());
    if let Err(e) = source.start() {
        source.remove_listener(&listener);
        return Err(e.into());
    }
    println!("Press Ctrl+C to stop");

    let mut next_status = Instant::now() + STATUS_INTERVAL;
    while !shutdown.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= next_status {
            println!("{}", status_line(&state.tick_and_snapshot(now)));
            next_status = now + STATUS_INTERVAL;
        }
        thread::sleep(SHUTDOWN_POLL.min(next_status.saturating_duration_since(now)));
    }

    source.stop();
    source.remove_listener(&listener);
    println!();
    Ok(state.unit())
}

/// One-line summary of the display, e.g. `HDG 135° SE  SPD 36 km/h`.
fn status_line(snapshot: &DisplaySnapshot) -> String {
    let heading = snapshot
        .animated_heading
        .map(format_heading)
        .unwrap_or_else(|| "---".to_string());
    let mut line = format!(
        "HDG {}  SPD {} {}",
        heading,
        format_speed(snapshot.speed_mps, snapshot.unit),
        snapshot.unit.label()
    );
    if let Some(message) = snapshot.advisory.message() {
        line.push_str(&format!("  [{}]", message));
    }
    line
}

/// Write `unit` back to the config file if it changed.
fn persist_unit(unit: UnitOfMeasure) {
    match ConfigFile::load() {
        Ok(mut config) if config.display.unit != unit => {
            config.display.unit = unit;
            match config.save() {
                Ok(()) => info!(unit = %unit, "Saved unit of measure"),
                Err(e) => warn!(error = %e, "Failed to save unit of measure"),
            }
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "Failed to load config, unit of measure not saved"),
    }
}
