//! Scene composer - owns the active effects and the camera
//!
//! The composer is the seam between the simulators and the host surface:
//! it advances every enabled effect from the frame clock, re-themes them on
//! theme commits and draws them into a vello scene on request.

use std::cell::RefCell;
use std::rc::Rc;

use neon_core::{FrameClock, FrameSubscription, FrameTick, ThemeEvent};
use neon_theme::ThemeDefinition;
use vello::Scene;
use vello::kurbo::{Affine, Rect};
use vello::peniko::{Brush, Fill};

use crate::camera::CameraRig;
use crate::effects::{
    FloatingGeometry, FrameContext, GeometryParams, MatrixRain, ParticleField, RainParams,
    SceneEffect, theme_color,
};
use crate::math::{Camera, Viewport};

/// Holograms in the themed scene
pub const HOLOGRAM_COUNT: usize = 12;

/// What the default effect stack is built from
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSettings {
    pub seed: Option<u64>,
    /// Pin the particle count instead of following the theme
    pub particle_count: Option<usize>,
    /// Innermost particle shell radius
    pub particle_spread: f32,
    pub rain: RainParams,
    pub geometry: GeometryParams,
    pub hologram_count: usize,
    pub camera_movement: bool,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            seed: None,
            particle_count: None,
            particle_spread: crate::effects::particles::BASE_RADIUS,
            rain: RainParams::default(),
            geometry: GeometryParams::default(),
            hologram_count: HOLOGRAM_COUNT,
            camera_movement: true,
        }
    }
}

impl SceneSettings {
    /// Derive a distinct seed per effect so they don't share a sequence
    fn seed_for(&self, salt: u64) -> Option<u64> {
        self.seed.map(|seed| seed.wrapping_add(salt))
    }
}

pub struct SceneComposer {
    effects: Vec<Box<dyn SceneEffect>>,
    camera_rig: CameraRig,
    camera: Camera,
    theme: &'static ThemeDefinition,
    /// Off-screen scenes neither simulate nor draw
    visible: bool,
    time: f32,
}

impl SceneComposer {
    /// Composer with no effects
    pub fn empty(theme: &'static ThemeDefinition, camera_movement: bool) -> Self {
        Self {
            effects: Vec::new(),
            camera_rig: CameraRig::new(theme, camera_movement),
            camera: Camera::default(),
            theme,
            visible: true,
            time: 0.0,
        }
    }

    /// The full themed scene: rain, particles, holograms and drifting shapes
    pub fn new(theme: &'static ThemeDefinition, settings: &SceneSettings) -> Self {
        let mut composer = Self::empty(theme, settings.camera_movement);

        composer.add_effect(Box::new(
            MatrixRain::new(settings.rain, settings.seed_for(1)).themed(theme),
        ));
        composer.add_effect(Box::new(
            ParticleField::new(theme, settings.seed_for(2))
                .with_base_radius(settings.particle_spread)
                .with_count_override(settings.particle_count),
        ));
        composer.add_effect(Box::new(FloatingGeometry::themed(
            theme,
            settings.hologram_count,
            settings.seed_for(3),
        )));
        composer.add_effect(Box::new(FloatingGeometry::new(
            settings.geometry,
            settings.seed_for(4),
        )));
        composer
    }

    pub fn add_effect(&mut self, effect: Box<dyn SceneEffect>) {
        self.effects.push(effect);
    }

    pub fn effects(&self) -> &[Box<dyn SceneEffect>] {
        &self.effects
    }

    pub fn effect_types(&self) -> Vec<&'static str> {
        self.effects.iter().map(|e| e.effect_type()).collect()
    }

    pub fn has_enabled_effects(&self) -> bool {
        self.effects.iter().any(|e| e.is_enabled())
    }

    pub fn theme(&self) -> &'static ThemeDefinition {
        self.theme
    }

    pub fn apply_theme(&mut self, theme: &'static ThemeDefinition) {
        self.theme = theme;
        self.camera_rig.apply_theme(theme);
        for effect in &mut self.effects {
            effect.apply_theme(theme);
        }
    }

    /// React to controller notifications; only commits change the scene
    pub fn handle_theme_event(&mut self, event: &ThemeEvent) {
        if let ThemeEvent::ThemeCommitted(id) = event {
            log::info!("Scene re-themed to {}", id);
            self.apply_theme(id.theme());
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_camera_movement(&mut self, enabled: bool) {
        self.camera_rig.set_enabled(enabled);
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Advance the camera and every enabled effect
    pub fn update(&mut self, tick: &FrameTick) {
        if !self.visible {
            return;
        }
        self.time = tick.time;
        self.camera = self.camera_rig.camera_at(tick.time);

        let frame = FrameContext::new(tick.time, tick.dt, self.camera.position);
        for effect in &mut self.effects {
            if effect.is_enabled() {
                effect.update(&frame);
            }
        }
    }

    /// Draw the background and every enabled effect into `scene`
    pub fn build_scene(&self, scene: &mut Scene, bounds: Rect) {
        if !self.visible {
            return;
        }

        scene.fill(
            Fill::NonZero,
            Affine::IDENTITY,
            &Brush::Solid(theme_color(self.theme.colors.background, 1.0)),
            None,
            &bounds,
        );

        let viewport = Viewport::new(bounds, self.camera);
        for effect in &self.effects {
            if effect.is_enabled() {
                effect.render(scene, &viewport);
            }
        }
    }

    /// Drive `composer` from `clock` until the subscription is dropped
    ///
    /// The clock holds only a weak reference: once the composer itself is
    /// dropped, frame callbacks do nothing.
    pub fn mount(composer: &Rc<RefCell<SceneComposer>>, clock: &FrameClock) -> FrameSubscription {
        let weak = Rc::downgrade(composer);
        log::info!("Scene mounted");
        clock.subscribe(move |tick| {
            if let Some(composer) = weak.upgrade() {
                if let Ok(mut composer) = composer.try_borrow_mut() {
                    composer.update(tick);
                }
            }
        })
    }
}
