//! Procedural 3D scene effects
//!
//! Each effect owns its simulation buffers, advances them once per frame and
//! projects them through the shared [`Viewport`] into a vello scene.
//!
//! ## Architecture
//!
//! Effects implement [`SceneEffect`]. The
//! [`SceneComposer`](crate::composer::SceneComposer) owns the enabled
//! effects, feeds them the frame time and camera, and re-themes them when the
//! active theme changes.
//!
//! Simulation never assumes a fixed frame delta: hosts may skip frames, so
//! anything time-based is either derived from absolute time or scaled by
//! the delta passed in.

pub mod geometry;
pub mod matrix;
pub mod particles;

pub use geometry::{
    FloatingGeometry, GeometryItem, GeometryParams, GeometryStyle, ItemColor, ShapeKind,
};
pub use matrix::{MatrixRain, RainParams, RainPalette, RainTier};
pub use particles::{ParticleBuffers, ParticleField, ParticleParams};

use neon_theme::{Color, ThemeDefinition};
use rand::SeedableRng;
use rand::rngs::StdRng;
use vello::Scene;
use vello::peniko;

use crate::math::{Vec3, Viewport};

/// Per-frame inputs shared by every effect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Seconds since the scene started
    pub time: f32,
    /// Seconds since the previous frame
    pub dt: f32,
    /// World-space camera position
    pub camera: Vec3,
}

impl FrameContext {
    pub fn new(time: f32, dt: f32, camera: Vec3) -> Self {
        Self { time, dt, camera }
    }
}

/// Trait for effects that simulate in 3D and draw into a vello scene
pub trait SceneEffect: Send {
    /// Unique identifier for this effect type (e.g. "particles", "matrix")
    fn effect_type(&self) -> &'static str;

    /// Advance the simulation by one frame
    fn update(&mut self, frame: &FrameContext);

    /// Project and draw into the scene
    fn render(&self, scene: &mut Scene, viewport: &Viewport);

    /// Re-read colors and tuning from a theme
    fn apply_theme(&mut self, theme: &ThemeDefinition);

    fn is_enabled(&self) -> bool;
}

/// Seeded generator, or one from OS entropy when no seed is given
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Convert linear RGB components plus alpha, clamping into range
pub(crate) fn rgb_color(rgb: [f32; 3], alpha: f32) -> peniko::Color {
    peniko::Color::new([
        rgb[0].clamp(0.0, 1.0),
        rgb[1].clamp(0.0, 1.0),
        rgb[2].clamp(0.0, 1.0),
        alpha.clamp(0.0, 1.0),
    ])
}

pub(crate) fn theme_color(color: Color, alpha: f32) -> peniko::Color {
    rgb_color(color.to_rgb_f32(), alpha)
}

/// Linear fog visibility for a point `depth` units from the camera
///
/// Fully visible before `50 * intensity`, gone past `200 * intensity`.
pub fn fog_visibility(depth: f32, intensity: f32) -> f32 {
    let near = 50.0 * intensity;
    let far = 200.0 * intensity;
    if far <= near {
        return 1.0;
    }
    (1.0 - (depth - near) / (far - near)).clamp(0.0, 1.0)
}
