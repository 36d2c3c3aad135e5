//! Floating wireframe and solid shapes
//!
//! Unlike the particle field, item positions are a pure function of time:
//! each frame recomputes the position from the stored origin, so sampling
//! the same time always yields the same point. Only rotation accumulates.

use std::f32::consts::{PI, TAU};

use neon_theme::{Color, ColorRole, ThemeDefinition};
use rand::Rng;
use rand::rngs::StdRng;
use vello::Scene;
use vello::kurbo::{Affine, BezPath, Circle, Stroke};
use vello::peniko::{Brush, Fill};

use super::{FrameContext, SceneEffect, fog_visibility, make_rng, theme_color};
use crate::math::{Vec3, Viewport};

/// Shape primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Box,
    Sphere,
    Torus,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 3] = [ShapeKind::Box, ShapeKind::Sphere, ShapeKind::Torus];
}

/// Construction and animation flavor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryStyle {
    /// Fixed neon palette, orbit radius 1
    Classic,
    /// Theme palette, intensity-scaled spread and wider orbits
    Themed { intensity: f32, animation_speed: f32 },
}

/// Where an item's color comes from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemColor {
    Fixed(Color),
    /// Resolved against the active theme
    Role(ColorRole),
}

const CLASSIC_PALETTE: [Color; 4] = [
    Color::hex(0x00ff41),
    Color::hex(0x00d4ff),
    Color::hex(0x8b5cf6),
    Color::hex(0xff0040),
];

const THEMED_ROLES: [ColorRole; 4] = [
    ColorRole::Primary,
    ColorRole::Secondary,
    ColorRole::Accent,
    ColorRole::Particle1,
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryParams {
    pub count: usize,
    /// Side of the cube items are scattered in
    pub spread: f32,
    pub speed: f32,
    pub style: GeometryStyle,
}

impl Default for GeometryParams {
    fn default() -> Self {
        Self {
            count: 15,
            spread: 30.0,
            speed: 0.01,
            style: GeometryStyle::Classic,
        }
    }
}

impl GeometryParams {
    /// Hologram settings for a theme
    pub fn themed(theme: &ThemeDefinition, count: usize) -> Self {
        Self {
            count,
            spread: 60.0,
            speed: 0.01,
            style: GeometryStyle::Themed {
                intensity: theme.effects.intensity,
                animation_speed: theme.effects.animation_speed,
            },
        }
    }
}

/// One floating shape
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryItem {
    /// Immutable base position
    pub origin: Vec3,
    pub rotation: Vec3,
    pub rotation_speed: Vec3,
    pub scale: f32,
    pub kind: ShapeKind,
    pub color: ItemColor,
    /// Vertical bob rate
    pub float_speed: f32,
    /// Angular rate of the orbit around the origin
    pub orbit_speed: f32,
    pub orbit_radius: f32,
    /// Vertical bob amplitude
    pub float_amplitude: f32,
    pub wireframe: bool,
    index: usize,
}

impl GeometryItem {
    /// Position at absolute time `t`
    pub fn position_at(&self, t: f32) -> Vec3 {
        let angle = t * self.orbit_speed;
        Vec3::new(
            self.origin.x + angle.cos() * self.orbit_radius,
            self.origin.y + (t * self.float_speed).sin() * self.float_amplitude,
            self.origin.z + angle.sin() * self.orbit_radius,
        )
    }

    /// Pulsed scale at absolute time `t`
    pub fn scale_at(&self, t: f32, style: GeometryStyle) -> f32 {
        let phase = self.index as f32;
        let pulse = match style {
            GeometryStyle::Classic => 1.0 + (t * 2.0 + phase).sin() * 0.1,
            GeometryStyle::Themed { .. } => 1.0 + (t * 3.0 + phase).sin() * 0.2,
        };
        self.scale * pulse
    }
}

/// A group of floating shapes
pub struct FloatingGeometry {
    enabled: bool,
    params: GeometryParams,
    items: Vec<GeometryItem>,
    group_rotation: Vec3,
    time: f32,
    palette: [Color; 4],
    rng: StdRng,
}

impl FloatingGeometry {
    pub fn new(params: GeometryParams, seed: Option<u64>) -> Self {
        let mut rng = make_rng(seed);
        let items = Self::generate(&params, &mut rng);
        Self {
            enabled: true,
            params,
            items,
            group_rotation: Vec3::ZERO,
            time: 0.0,
            palette: CLASSIC_PALETTE,
            rng,
        }
    }

    /// Holograms colored and scaled by `theme`
    pub fn themed(theme: &ThemeDefinition, count: usize, seed: Option<u64>) -> Self {
        let mut geometry = Self::new(GeometryParams::themed(theme, count), seed);
        geometry.palette = Self::resolve_palette(theme);
        geometry
    }

    fn resolve_palette(theme: &ThemeDefinition) -> [Color; 4] {
        THEMED_ROLES.map(|role| theme.colors.get(role))
    }

    fn generate(params: &GeometryParams, rng: &mut impl Rng) -> Vec<GeometryItem> {
        (0..params.count)
            .map(|index| match params.style {
                GeometryStyle::Classic => Self::classic_item(params, index, rng),
                GeometryStyle::Themed {
                    intensity,
                    animation_speed,
                } => Self::themed_item(params, index, intensity, animation_speed, rng),
            })
            .collect()
    }

    fn classic_item(params: &GeometryParams, index: usize, rng: &mut impl Rng) -> GeometryItem {
        let half = params.spread / 2.0;
        let mut axis = || {
            if half > 0.0 { rng.gen_range(-half..half) } else { 0.0 }
        };
        let origin = Vec3::new(axis(), axis(), axis());

        GeometryItem {
            origin,
            rotation: Vec3::new(
                rng.gen_range(0.0..TAU),
                rng.gen_range(0.0..TAU),
                rng.gen_range(0.0..TAU),
            ),
            rotation_speed: Vec3::new(
                rng.gen_range(-0.01..0.01),
                rng.gen_range(-0.01..0.01),
                rng.gen_range(-0.01..0.01),
            ),
            scale: rng.gen_range(0.5..2.0),
            kind: ShapeKind::ALL[rng.gen_range(0..ShapeKind::ALL.len())],
            color: ItemColor::Fixed(CLASSIC_PALETTE[rng.gen_range(0..CLASSIC_PALETTE.len())]),
            float_speed: rng.gen_range(0.01..0.03),
            orbit_speed: params.speed * 50.0,
            orbit_radius: 1.0,
            float_amplitude: 2.0,
            wireframe: rng.gen_bool(0.3),
            index,
        }
    }

    fn themed_item(
        params: &GeometryParams,
        index: usize,
        intensity: f32,
        animation_speed: f32,
        rng: &mut impl Rng,
    ) -> GeometryItem {
        let extent = Vec3::new(params.spread, params.spread * 2.0 / 3.0, params.spread) * intensity;
        let mut axis = |size: f32| {
            let half = size / 2.0;
            if half > 0.0 { rng.gen_range(-half..half) } else { 0.0 }
        };
        let origin = Vec3::new(axis(extent.x), axis(extent.y), axis(extent.z));

        let speed = rng.gen_range(0.01..0.03) * animation_speed;
        GeometryItem {
            origin,
            rotation: Vec3::new(
                rng.gen_range(0.0..PI),
                rng.gen_range(0.0..PI),
                rng.gen_range(0.0..PI),
            ),
            rotation_speed: Vec3::new(speed * 2.0, speed * 1.5, speed * 0.5),
            scale: rng.gen_range(0.5..2.5) * intensity,
            kind: ShapeKind::ALL[rng.gen_range(0..ShapeKind::ALL.len())],
            color: ItemColor::Role(THEMED_ROLES[rng.gen_range(0..THEMED_ROLES.len())]),
            float_speed: speed * 10.0,
            orbit_speed: speed * 5.0,
            orbit_radius: rng.gen_range(2.0..7.0),
            float_amplitude: 3.0 * intensity,
            wireframe: rng.gen_bool(0.5),
            index,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn params(&self) -> &GeometryParams {
        &self.params
    }

    pub fn items(&self) -> &[GeometryItem] {
        &self.items
    }

    pub fn group_rotation(&self) -> Vec3 {
        self.group_rotation
    }

    /// Advance spin and group rotation; positions are derived on demand
    pub fn step(&mut self, time: f32) {
        self.time = time;
        for item in &mut self.items {
            item.rotation = item.rotation + item.rotation_speed;
        }
        self.group_rotation = match self.params.style {
            GeometryStyle::Classic => Vec3::new(0.0, time * self.params.speed * 10.0, 0.0),
            GeometryStyle::Themed {
                animation_speed, ..
            } => Vec3::new(0.0, time * 0.02 * animation_speed, 0.0),
        };
    }

    fn item_color(&self, item: &GeometryItem) -> Color {
        match item.color {
            ItemColor::Fixed(color) => color,
            ItemColor::Role(role) => {
                let slot = THEMED_ROLES.iter().position(|r| *r == role).unwrap_or(0);
                self.palette[slot]
            }
        }
    }

    fn opacity(&self) -> f32 {
        match self.params.style {
            GeometryStyle::Classic => 0.6,
            GeometryStyle::Themed { intensity, .. } => 0.4 * intensity,
        }
    }

    fn intensity(&self) -> f32 {
        match self.params.style {
            GeometryStyle::Classic => 1.0,
            GeometryStyle::Themed { intensity, .. } => intensity,
        }
    }

    /// Outline points of a shape in local space, before rotation and scale
    fn outline(kind: ShapeKind) -> Vec<Vec<Vec3>> {
        match kind {
            ShapeKind::Box => {
                let c = |x: f32, y: f32, z: f32| Vec3::new(x * 0.5, y * 0.5, z * 0.5);
                let front = vec![
                    c(-1., -1., 1.),
                    c(1., -1., 1.),
                    c(1., 1., 1.),
                    c(-1., 1., 1.),
                    c(-1., -1., 1.),
                ];
                let back = vec![
                    c(-1., -1., -1.),
                    c(1., -1., -1.),
                    c(1., 1., -1.),
                    c(-1., 1., -1.),
                    c(-1., -1., -1.),
                ];
                let mut edges = vec![front, back];
                for (x, y) in [(-1., -1.), (1., -1.), (1., 1.), (-1., 1.)] {
                    edges.push(vec![c(x, y, -1.), c(x, y, 1.)]);
                }
                edges
            }
            ShapeKind::Sphere => {
                // Three great circles
                let ring = |f: fn(f32) -> Vec3| -> Vec<Vec3> {
                    (0..=24).map(|s| f(s as f32 / 24.0 * TAU)).collect()
                };
                vec![
                    ring(|a| Vec3::new(a.cos(), a.sin(), 0.0)),
                    ring(|a| Vec3::new(a.cos(), 0.0, a.sin())),
                    ring(|a| Vec3::new(0.0, a.cos(), a.sin())),
                ]
            }
            ShapeKind::Torus => {
                let ring = |r: f32, y: f32| -> Vec<Vec3> {
                    (0..=24)
                        .map(|s| {
                            let a = s as f32 / 24.0 * TAU;
                            Vec3::new(a.cos() * r, y, a.sin() * r)
                        })
                        .collect()
                };
                vec![ring(1.3, 0.0), ring(0.7, 0.0), ring(1.0, 0.3), ring(1.0, -0.3)]
            }
        }
    }
}

impl SceneEffect for FloatingGeometry {
    fn effect_type(&self) -> &'static str {
        "geometry"
    }

    fn update(&mut self, frame: &FrameContext) {
        if self.enabled {
            self.step(frame.time);
        }
    }

    fn render(&self, scene: &mut Scene, viewport: &Viewport) {
        if !self.enabled {
            return;
        }

        let opacity = self.opacity();
        let intensity = self.intensity();

        for item in &self.items {
            let center = item.position_at(self.time);
            let scale = item.scale_at(self.time, self.params.style);
            let Some(projected_center) = viewport.project(center.rotate_euler(self.group_rotation))
            else {
                continue;
            };
            let alpha = opacity * fog_visibility(projected_center.depth, intensity);
            if alpha <= 0.01 {
                continue;
            }
            let brush = Brush::Solid(theme_color(self.item_color(item), alpha));

            if !item.wireframe {
                // Soft body behind the outline
                let radius = (scale as f64 * projected_center.scale * 0.8).min(400.0);
                let fill = Brush::Solid(theme_color(self.item_color(item), alpha * 0.35));
                scene.fill(
                    Fill::NonZero,
                    Affine::IDENTITY,
                    &fill,
                    None,
                    &Circle::new(projected_center.point, radius),
                );
            }

            for polyline in Self::outline(item.kind) {
                let mut path = BezPath::new();
                let mut started = false;
                for local in polyline {
                    let world = (local * scale).rotate_euler(item.rotation) + center;
                    let Some(projected) = viewport.project(world.rotate_euler(self.group_rotation))
                    else {
                        started = false;
                        continue;
                    };
                    if started {
                        path.line_to(projected.point);
                    } else {
                        path.move_to(projected.point);
                        started = true;
                    }
                }
                scene.stroke(&Stroke::new(1.2), Affine::IDENTITY, &brush, None, &path);
            }
        }
    }

    fn apply_theme(&mut self, theme: &ThemeDefinition) {
        if let GeometryStyle::Themed { .. } = self.params.style {
            let next = GeometryParams::themed(theme, self.params.count);
            if next.style != self.params.style {
                self.params = next;
                self.items = Self::generate(&self.params, &mut self.rng);
            }
            self.palette = Self::resolve_palette(theme);
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
