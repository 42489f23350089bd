//! SpeedHUD - a heading and ground speed head-up display.
//!
//! The library holds everything except the host: angle math, the heading
//! animator, advisory selection, the compass renderer, the fixed-rate render
//! loop, orientation sources (X-Plane telemetry and a simulator),
//! configuration and logging setup.
//!
//! A host creates a [`hud::SpeedHud`] with an orientation source and hands it
//! a [`surface::Surface`] once one exists.

pub mod angle;
pub mod config;
pub mod hud;
pub mod logging;
pub mod orientation;
pub mod render;
pub mod scheduler;
pub mod surface;
pub mod units;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
