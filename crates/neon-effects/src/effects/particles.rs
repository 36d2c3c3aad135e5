//! Layered particle field
//!
//! Particles are scattered over five concentric spherical shells and colored
//! by distance from the origin, nearest shell first. Every frame each
//! particle is nudged by a depth-weighted sinusoidal wave. The nudge is added
//! to the particle's current position, so the field drifts over time rather
//! than oscillating around a fixed origin.

use neon_theme::{Color, ThemeDefinition};
use rand::Rng;
use rand::rngs::StdRng;
use vello::Scene;
use vello::kurbo::{Affine, Circle};
use vello::peniko::{Brush, Fill};

use super::{FrameContext, SceneEffect, fog_visibility, make_rng, rgb_color};
use crate::math::{Vec3, Viewport};

/// Number of concentric shells
pub const SHELL_COUNT: usize = 5;

/// Radius of the innermost shell before scaling
pub const BASE_RADIUS: f32 = 30.0;

/// Radial distance between shells
pub const SHELL_WIDTH: f32 = 20.0;

/// Distance over which the palette is spread
const COLOR_DISTANCE: f32 = 100.0;

/// Inputs to particle construction
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleParams {
    pub count: usize,
    pub base_radius: f32,
    pub shell_width: f32,
    pub intensity: f32,
    pub animation_speed: f32,
    /// Colors from nearest to farthest
    pub palette: Vec<Color>,
}

impl ParticleParams {
    pub fn from_theme(theme: &ThemeDefinition) -> Self {
        Self {
            count: theme.effects.particle_count,
            base_radius: BASE_RADIUS,
            shell_width: SHELL_WIDTH,
            intensity: theme.effects.intensity,
            animation_speed: theme.effects.animation_speed,
            palette: theme.colors.particle_palette(),
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn with_base_radius(mut self, radius: f32) -> Self {
        self.base_radius = radius;
        self
    }

    /// Upper bound on any particle's initial distance from the origin
    pub fn max_radius(&self) -> f32 {
        (self.base_radius + (SHELL_COUNT - 1) as f32 * self.shell_width) * self.intensity
    }

    /// Shell index for particle `i`
    pub fn layer_of(&self, i: usize) -> usize {
        if self.count == 0 {
            return 0;
        }
        ((i * SHELL_COUNT) / self.count).min(SHELL_COUNT - 1)
    }

    /// Palette entry for a particle at `distance` from the origin
    pub fn color_for_distance(&self, distance: f32) -> Color {
        if self.palette.is_empty() {
            return Color::WHITE;
        }
        let last = self.palette.len() - 1;
        let bin = (distance / COLOR_DISTANCE * self.palette.len() as f32).floor();
        let index = if bin.is_finite() && bin > 0.0 { (bin as usize).min(last) } else { 0 };
        self.palette[index]
    }
}

/// Flat simulation buffers
///
/// `positions` and `colors` hold three floats per particle, `sizes` one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleBuffers {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
    pub sizes: Vec<f32>,
    /// Unpulsed colors assigned at construction
    base_colors: Vec<f32>,
}

impl ParticleBuffers {
    /// Build the initial buffers
    pub fn initialize(params: &ParticleParams, rng: &mut impl Rng) -> Self {
        let count = params.count;
        let mut positions = Vec::with_capacity(count * 3);
        let mut colors = Vec::with_capacity(count * 3);
        let mut sizes = Vec::with_capacity(count);

        for i in 0..count {
            let layer = params.layer_of(i);
            let shell = params.base_radius + layer as f32 * params.shell_width;
            let radius = shell * rng.gen_range(0.5..=1.0) * params.intensity;
            let phi = rng.gen_range(0.0..std::f32::consts::PI);
            let theta = rng.gen_range(0.0..std::f32::consts::TAU);

            let p = Vec3::from_spherical(radius, phi, theta);
            positions.extend_from_slice(&[p.x, p.y, p.z]);
            colors.extend_from_slice(&params.color_for_distance(p.length()).to_rgb_f32());
            sizes.push(rng.gen_range(0.5..3.5) * params.intensity);
        }

        Self {
            positions,
            base_colors: colors.clone(),
            colors,
            sizes,
        }
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn position(&self, i: usize) -> Vec3 {
        let i3 = i * 3;
        Vec3::new(self.positions[i3], self.positions[i3 + 1], self.positions[i3 + 2])
    }

    /// Re-bin colors against a new palette without moving anything
    pub fn recolor(&mut self, params: &ParticleParams) {
        for i in 0..self.len() {
            let rgb = params.color_for_distance(self.position(i).length()).to_rgb_f32();
            self.base_colors[i * 3..i * 3 + 3].copy_from_slice(&rgb);
            self.colors[i * 3..i * 3 + 3].copy_from_slice(&rgb);
        }
    }

    /// Advance one frame at absolute time `time`
    ///
    /// Position offsets accumulate onto the stored positions. Colors are
    /// the construction colors scaled by a distance-to-camera pulse.
    pub fn update(&mut self, time: f32, camera: Vec3, intensity: f32, speed: f32) {
        for i in 0..self.len() {
            let i3 = i * 3;
            let x = self.positions[i3];
            let y = self.positions[i3 + 1];
            let z = self.positions[i3 + 2];

            let wave = (1.0 - z.abs() / 100.0) * intensity;
            let nx = x + (time * 0.5 * speed + y * 0.05).sin() * wave;
            let ny = y + (time * 0.3 * speed + x * 0.05).cos() * wave;
            let nz = z + (time * 0.4 * speed + (x + y) * 0.03).sin() * 0.5;
            self.positions[i3] = nx;
            self.positions[i3 + 1] = ny;
            self.positions[i3 + 2] = nz;

            let distance = Vec3::new(nx, ny, nz).distance(camera);
            let pulse = (time * 2.0 * speed + distance * 0.1).sin() * 0.3 + 0.7;
            let factor = pulse * intensity;
            for c in 0..3 {
                self.colors[i3 + c] = self.base_colors[i3 + c] * factor;
            }
        }
    }
}

/// Slow three-axis rotation of the whole field
pub fn group_rotation(time: f32, speed: f32) -> Vec3 {
    Vec3::new(
        (time * 0.1 * speed).sin() * 0.2,
        time * 0.05 * speed,
        (time * 0.15 * speed).cos() * 0.1,
    )
}

/// Theme-driven particle field effect
pub struct ParticleField {
    enabled: bool,
    params: ParticleParams,
    buffers: ParticleBuffers,
    rotation: Vec3,
    count_override: Option<usize>,
    rng: StdRng,
}

impl ParticleField {
    pub fn new(theme: &ThemeDefinition, seed: Option<u64>) -> Self {
        Self::with_params(ParticleParams::from_theme(theme), make_rng(seed))
    }

    pub fn with_params(params: ParticleParams, mut rng: StdRng) -> Self {
        let buffers = ParticleBuffers::initialize(&params, &mut rng);
        Self {
            enabled: true,
            params,
            buffers,
            rotation: Vec3::ZERO,
            count_override: None,
            rng,
        }
    }

    /// Pin the particle count regardless of theme
    pub fn with_count_override(mut self, count: Option<usize>) -> Self {
        self.count_override = count;
        if let Some(count) = count {
            if count != self.params.count {
                self.params.count = count;
                self.rebuild();
            }
        }
        self
    }

    pub fn with_base_radius(mut self, radius: f32) -> Self {
        if radius != self.params.base_radius {
            self.params.base_radius = radius;
            self.rebuild();
        }
        self
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn params(&self) -> &ParticleParams {
        &self.params
    }

    pub fn buffers(&self) -> &ParticleBuffers {
        &self.buffers
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    fn rebuild(&mut self) {
        self.buffers = ParticleBuffers::initialize(&self.params, &mut self.rng);
        log::debug!("Rebuilt particle field with {} particles", self.params.count);
    }
}

impl SceneEffect for ParticleField {
    fn effect_type(&self) -> &'static str {
        "particles"
    }

    fn update(&mut self, frame: &FrameContext) {
        if !self.enabled {
            return;
        }
        self.buffers.update(
            frame.time,
            frame.camera,
            self.params.intensity,
            self.params.animation_speed,
        );
        self.rotation = group_rotation(frame.time, self.params.animation_speed);
    }

    fn render(&self, scene: &mut Scene, viewport: &Viewport) {
        if !self.enabled || self.buffers.is_empty() {
            return;
        }

        let intensity = self.params.intensity;
        let opacity = 0.9 * intensity;

        for i in 0..self.buffers.len() {
            let world = self.buffers.position(i).rotate_euler(self.rotation);
            let Some(projected) = viewport.project(world) else {
                continue;
            };
            if !viewport.bounds.contains(projected.point) {
                continue;
            }

            let alpha = opacity * fog_visibility(projected.depth, intensity);
            if alpha <= 0.01 {
                continue;
            }

            let i3 = i * 3;
            let rgb = [
                self.buffers.colors[i3],
                self.buffers.colors[i3 + 1],
                self.buffers.colors[i3 + 2],
            ];
            let radius = (self.buffers.sizes[i] as f64 * 0.05 * projected.scale).clamp(0.4, 8.0);
            let circle = Circle::new(projected.point, radius);
            scene.fill(
                Fill::NonZero,
                Affine::IDENTITY,
                &Brush::Solid(rgb_color(rgb, alpha)),
                None,
                &circle,
            );
        }
    }

    fn apply_theme(&mut self, theme: &ThemeDefinition) {
        let mut next = ParticleParams::from_theme(theme).with_base_radius(self.params.base_radius);
        if let Some(count) = self.count_override {
            next.count = count;
        }

        let reshape = next.count != self.params.count || next.intensity != self.params.intensity;
        self.params = next;
        if reshape {
            self.rebuild();
        } else {
            self.buffers.recolor(&self.params);
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neon_theme::{ThemeId, get_theme};

    fn params(count: usize) -> ParticleParams {
        ParticleParams::from_theme(get_theme(ThemeId::Neutral)).with_count(count)
    }

    #[test]
    fn test_buffer_lengths() {
        let mut rng = make_rng(Some(1));
        let buffers = ParticleBuffers::initialize(&params(250), &mut rng);
        assert_eq!(buffers.positions.len(), 750);
        assert_eq!(buffers.colors.len(), 750);
        assert_eq!(buffers.sizes.len(), 250);
    }

    #[test]
    fn test_zero_count_is_empty() {
        let mut rng = make_rng(Some(1));
        let buffers = ParticleBuffers::initialize(&params(0), &mut rng);
        assert!(buffers.is_empty());
        assert!(buffers.positions.is_empty());
    }

    #[test]
    fn test_positions_within_max_radius() {
        for id in ThemeId::ALL {
            let params = ParticleParams::from_theme(get_theme(id)).with_count(2000);
            let mut rng = make_rng(Some(7));
            let buffers = ParticleBuffers::initialize(&params, &mut rng);
            let bound = params.max_radius() + 1e-3;
            for i in 0..buffers.len() {
                assert!(buffers.position(i).length() <= bound);
            }
        }
    }

    #[test]
    fn test_layers_split_evenly() {
        let even = params(10);
        let layers: Vec<usize> = (0..10).map(|i| even.layer_of(i)).collect();
        assert_eq!(layers, vec![0, 0, 1, 1, 2, 2, 3, 3, 4, 4]);
        // Fewer particles than shells still stays in range
        let small = params(3);
        assert!((0..3).all(|i| small.layer_of(i) < SHELL_COUNT));
    }

    #[test]
    fn test_color_bins_by_distance() {
        let params = params(1);
        let palette = params.palette.clone();
        assert_eq!(params.color_for_distance(0.0), palette[0]);
        assert_eq!(params.color_for_distance(19.9), palette[0]);
        assert_eq!(params.color_for_distance(21.0), palette[1]);
        assert_eq!(params.color_for_distance(65.0), palette[3]);
        assert_eq!(params.color_for_distance(500.0), palette[4]);
    }

    #[test]
    fn test_sizes_scale_with_intensity() {
        let theme = get_theme(ThemeId::Zeus);
        let params = ParticleParams::from_theme(theme).with_count(500);
        let mut rng = make_rng(Some(3));
        let buffers = ParticleBuffers::initialize(&params, &mut rng);
        let i = theme.effects.intensity;
        assert!(buffers.sizes.iter().all(|&s| s >= 0.5 * i && s < 3.5 * i));
    }

    #[test]
    fn test_update_drifts_from_current_position() {
        let params = params(50);
        let mut rng = make_rng(Some(9));
        let mut once = ParticleBuffers::initialize(&params, &mut rng);
        let mut twice = once.clone();

        once.update(1.0, Vec3::new(0.0, 0.0, 30.0), 1.0, 1.0);
        twice.update(1.0, Vec3::new(0.0, 0.0, 30.0), 1.0, 1.0);
        twice.update(1.0, Vec3::new(0.0, 0.0, 30.0), 1.0, 1.0);

        // Same time applied twice moves further: offsets accumulate
        assert_ne!(once.positions, twice.positions);
    }

    #[test]
    fn test_color_pulse_stays_bounded() {
        let params = params(100);
        let mut rng = make_rng(Some(11));
        let mut buffers = ParticleBuffers::initialize(&params, &mut rng);
        let base = buffers.colors.clone();
        for frame in 0..120 {
            buffers.update(frame as f32 / 60.0, Vec3::new(0.0, 0.0, 30.0), 1.0, 1.0);
        }
        for (c, b) in buffers.colors.iter().zip(base.iter()) {
            assert!(*c >= b * 0.4 - 1e-5 && *c <= b * 1.0 + 1e-5);
        }
    }

    #[test]
    fn test_group_rotation_rates() {
        let r = group_rotation(10.0, 1.0);
        assert!((r.y - 0.5).abs() < 1e-6);
        assert!((r.x - (1.0f32).sin() * 0.2).abs() < 1e-6);
        assert!((r.z - (1.5f32).cos() * 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_theme_change_rebuilds_on_count_change() {
        let mut field = ParticleField::new(get_theme(ThemeId::Neutral), Some(5));
        assert_eq!(field.buffers().len(), 6000);
        field.apply_theme(get_theme(ThemeId::Rogue));
        assert_eq!(field.buffers().len(), 8000);
    }

    #[test]
    fn test_count_override_survives_theme_change() {
        let mut field =
            ParticleField::new(get_theme(ThemeId::Neutral), Some(5)).with_count_override(Some(64));
        assert_eq!(field.buffers().len(), 64);
        field.apply_theme(get_theme(ThemeId::Zeus));
        assert_eq!(field.buffers().len(), 64);
        assert_eq!(field.params().intensity, 2.0);
    }

    #[test]
    fn test_disabled_field_does_not_move() {
        let mut field =
            ParticleField::new(get_theme(ThemeId::Neutral), Some(5)).with_count_override(Some(10));
        field.set_enabled(false);
        let before = field.buffers().positions.clone();
        field.update(&FrameContext::new(1.0, 0.016, Vec3::new(0.0, 0.0, 30.0)));
        assert_eq!(field.buffers().positions, before);
    }
}
