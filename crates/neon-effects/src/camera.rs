//! Slow cinematic camera drift

use neon_theme::ThemeDefinition;

use crate::math::{Camera, Vec3};

/// Moves the camera on a slow Lissajous path scaled by theme intensity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    enabled: bool,
    intensity: f32,
    speed: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            enabled: true,
            intensity: 1.0,
            speed: 1.0,
        }
    }
}

impl CameraRig {
    pub fn new(theme: &ThemeDefinition, enabled: bool) -> Self {
        let mut rig = Self {
            enabled,
            ..Self::default()
        };
        rig.apply_theme(theme);
        rig
    }

    pub fn apply_theme(&mut self, theme: &ThemeDefinition) {
        self.intensity = theme.effects.intensity;
        self.speed = theme.effects.animation_speed;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Camera at absolute time `t`; fixed at the rest pose when disabled
    pub fn camera_at(&self, t: f32) -> Camera {
        if !self.enabled {
            return Camera::default();
        }

        let s = self.speed;
        let i = self.intensity;
        Camera {
            position: Vec3::new(
                (t * 0.1 * s).sin() * 5.0 * i,
                (t * 0.15 * s).cos() * 3.0 * i,
                30.0 + (t * 0.05 * s).sin() * 10.0 * i,
            ),
            target: Vec3::new((t * 0.2 * s).sin() * 2.0, (t * 0.25 * s).cos(), 0.0),
            ..Camera::default()
        }
    }
}
