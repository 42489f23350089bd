//! CLI command implementations.
//!
//! - [`config`] - Configuration management (path, show, set-unit)
//! - [`run`] - Show the HUD, or a status line when headless

pub mod config;
pub mod run;
