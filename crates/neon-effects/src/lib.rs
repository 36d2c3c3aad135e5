//! Neon Effects - procedural backdrop simulation and rendering
//!
//! This crate provides:
//! - Particle field, matrix rain and floating geometry simulators ([`effects`])
//! - A cinematic [`CameraRig`] and the 3D projection they share ([`math`])
//! - The [`GlitchText`] and [`TypingAnimation`] text effects
//! - A [`SceneComposer`] that drives the effects from a frame clock and a
//!   [`SceneRenderer`] that rasterizes them with vello

pub mod camera;
pub mod composer;
pub mod effects;
pub mod glitch;
pub mod math;
pub mod renderer;
pub mod typing;

pub use camera::CameraRig;
pub use composer::{SceneComposer, SceneSettings};
pub use effects::{FrameContext, SceneEffect, make_rng};
pub use glitch::{GlitchText, GlitchTuning};
pub use math::{Camera, Vec3, Viewport};
pub use renderer::SceneRenderer;
pub use typing::{TypingAnimation, TypingOptions, TypingPhase};
