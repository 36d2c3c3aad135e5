//! Neon Core - theme state and timing
//!
//! This crate provides:
//! - A delayed-task [`Scheduler`] driven by explicit host time
//! - A [`FrameClock`] whose registrations end when their guard drops
//! - The [`ThemeController`] state machine that owns the active theme

pub mod clock;
pub mod controller;
pub mod scheduler;

pub use clock::{FrameClock, FrameSubscription, FrameTick};
pub use controller::{
    restore_theme, OverlayState, StyleDocument, StyleSurface, SwitchOutcome, ThemeController,
    ThemeEvent, ThemeState, ThemeSubscription, TransitionTimings,
};
pub use scheduler::{Scheduler, TaskId};
