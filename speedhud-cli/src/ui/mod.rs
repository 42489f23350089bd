//! Terminal user interface.
//!
//! The render thread owns the [`TerminalSurface`]; this module's event loop
//! runs on the main thread and only reads input, forwarding resizes and
//! key presses to the HUD.

mod terminal_surface;

pub use terminal_surface::{restore_terminal, TerminalSurface};

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use speedhud::hud::SpeedHud;
use speedhud::orientation::OrientationSource;
use speedhud::surface::Surface;
use tracing::debug;

/// How long to wait for input before re-checking the shutdown flag.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    CycleUnit,
    Quit,
}

/// Map a key press to an action.
pub fn action_for_key(key: KeyEvent) -> Option<UiAction> {
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('C') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(UiAction::Quit)
        }
        KeyCode::Char('u') | KeyCode::Char('U') => Some(UiAction::CycleUnit),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(UiAction::Quit),
        _ => None,
    }
}

/// Handle input until the user quits or `shutdown` is set.
pub fn run_event_loop<O, S>(hud: &SpeedHud<O, S>, shutdown: &AtomicBool) -> io::Result<()>
where
    O: OrientationSource,
    S: Surface + 'static,
{
    while !shutdown.load(Ordering::SeqCst) {
        if !event::poll(POLL_INTERVAL)? {
            continue;
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match action_for_key(key) {
                Some(UiAction::Quit) => {
                    debug!("Quit requested");
                    break;
                }
                Some(UiAction::CycleUnit) => {
                    hud.set_unit_of_measure(hud.unit_of_measure().next());
                }
                None => {}
            },
            Event::Resize(width, height) => {
                hud.on_surface_changed(width as u32, height as u32);
            }
            _ => {}
        }
    }

    Ok(())
}

/// Restore the terminal before the default panic message is printed.
///
/// Only panics on the main thread restore the terminal; a panic inside a
/// frame draw is caught by the render loop and must not tear the HUD down.
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if thread::current().name() == Some("main") {
            let _ = restore_terminal();
        }
        previous(info);
    }));
}
