//! Neonfolio - themed cyberpunk backdrop showcase
//!
//! The window host lives in `main.rs`. The implementation lives in:
//! - `neon-theme` - theme registry and stylesheet emission
//! - `neon-config` - config file, durable preference, hot-reload
//! - `neon-core` - scheduler, frame clock, theme controller
//! - `neon-effects` - simulators, text effects and scene rendering
//!
//! This crate holds the window-independent parts of the showcase so they
//! can be exercised from tests.

mod commands;
pub mod showcase;

pub use commands::Command;
pub use showcase::{Showcase, scene_settings, typing_options};
