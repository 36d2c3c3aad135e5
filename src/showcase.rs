//! Showcase state
//!
//! Everything the window displays, without the window: the theme controller
//! and its style document, the animated scene, the glitch headline and the
//! typed tagline. The host calls [`Showcase::tick`] once per redraw with the
//! time since launch and renders [`Showcase::composer`].

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::time::Duration;

use neon_config::{Config, PreferenceEvent, PreferenceStore, PreferenceWatcher};
use neon_core::{
    FrameClock, FrameSubscription, FrameTick, OverlayState, StyleDocument, SwitchOutcome,
    ThemeController, ThemeEvent, ThemeSubscription,
};
use neon_effects::effects::{GeometryParams, GeometryStyle, RainParams};
use neon_effects::{GlitchText, SceneComposer, SceneSettings, TypingAnimation, TypingOptions};
use neon_theme::ThemeId;

use crate::commands::Command;

/// Scene construction parameters from the `[general]` and `[scene]` sections
pub fn scene_settings(config: &Config) -> SceneSettings {
    let scene = &config.scene;
    SceneSettings {
        seed: config.general.seed,
        particle_count: scene.particle_count,
        particle_spread: scene.particle_spread,
        rain: RainParams {
            columns: scene.matrix_columns,
            rows: scene.matrix_rows,
            speed: scene.matrix_speed,
            ..RainParams::default()
        },
        geometry: GeometryParams {
            count: scene.geometry_count,
            spread: scene.geometry_spread,
            speed: scene.geometry_speed,
            style: GeometryStyle::Classic,
        },
        camera_movement: scene.camera_movement,
        ..SceneSettings::default()
    }
}

pub fn typing_options(config: &Config) -> TypingOptions {
    let typing = &config.typing;
    TypingOptions {
        lines: typing.lines.clone(),
        speed: Duration::from_millis(typing.speed_ms),
        initial_delay: Duration::from_millis(typing.initial_delay_ms),
        looping: typing.loop_lines,
        loop_delay: Duration::from_millis(typing.loop_delay_ms),
    }
}

/// Theme used when no valid preference is stored
fn default_theme(config: &Config) -> ThemeId {
    match config.general.theme.parse::<ThemeId>() {
        Ok(id) => id,
        Err(e) => {
            log::warn!("{} in config, using {}", e, ThemeId::default());
            ThemeId::default()
        }
    }
}

pub struct Showcase {
    clock: FrameClock,
    controller: ThemeController,
    document: StyleDocument,
    theme_events: ThemeSubscription,
    composer: Rc<RefCell<SceneComposer>>,
    frame_subscription: Option<FrameSubscription>,
    glitch: GlitchText,
    typing: TypingAnimation,
    watcher: Option<PreferenceWatcher>,
}

impl Showcase {
    pub fn new(
        config: &Config,
        store: Box<dyn PreferenceStore>,
        watcher: Option<PreferenceWatcher>,
    ) -> Self {
        let document = StyleDocument::new();
        let mut controller =
            ThemeController::with_default(store, Box::new(document.clone()), default_theme(config));
        let theme_events = controller.subscribe();
        let theme = controller.theme();

        let clock = FrameClock::new();
        let composer = Rc::new(RefCell::new(SceneComposer::new(theme, &scene_settings(config))));
        let frame_subscription = Some(SceneComposer::mount(&composer, &clock));

        let mut glitch = GlitchText::new(
            config.glitch.text.as_str(),
            theme.effects.glitch_level,
            config.general.seed.map(|seed| seed.wrapping_add(5)),
        );
        if config.glitch.auto_trigger {
            glitch =
                glitch.with_auto_trigger(Duration::from_millis(config.glitch.base_interval_ms));
        }

        let typing = TypingAnimation::new(typing_options(config))
            .on_complete(|| log::debug!("Tagline fully typed"));

        Self {
            clock,
            controller,
            document,
            theme_events,
            composer,
            frame_subscription,
            glitch,
            typing,
            watcher,
        }
    }

    /// Arm the timers; call once when the window appears
    pub fn start(&mut self, now: Duration) {
        self.glitch.start(now);
        self.typing.start(now);
    }

    /// Execute a command; returns false when the showcase should close
    pub fn execute(&mut self, command: Command, now: Duration) -> bool {
        match command {
            Command::SwitchTheme(id) => {
                if self.controller.set_theme(id, now) == SwitchOutcome::Busy {
                    log::debug!("Theme switch to {} ignored while transitioning", id);
                }
            }
            Command::Glitch => {
                self.glitch.hover(now);
            }
            Command::ToggleScene => {
                let mut composer = self.composer.borrow_mut();
                let visible = !composer.is_visible();
                composer.set_visible(visible);
                log::info!("Scene {}", if visible { "shown" } else { "hidden" });
            }
            Command::Quit => return false,
        }
        true
    }

    /// Advance everything to host time `now`
    pub fn tick(&mut self, now: Duration) -> FrameTick {
        self.apply_external_preferences(now);

        self.controller.tick(now);
        for event in self.theme_events.drain() {
            self.composer.borrow_mut().handle_theme_event(&event);
            if let ThemeEvent::ThemeCommitted(id) = event {
                self.glitch.apply_theme(id.theme(), now);
            }
        }

        self.glitch.tick(now);
        self.typing.tick(now);
        self.clock.advance(now)
    }

    /// Forward preference edits made by other processes to the controller
    fn apply_external_preferences(&mut self, now: Duration) {
        let Some(watcher) = self.watcher.as_ref() else {
            return;
        };
        for event in watcher.drain_events() {
            match event {
                PreferenceEvent::ThemeChanged(name) => {
                    match self.controller.set_theme_by_name(&name, now) {
                        Ok(outcome) => log::debug!("External preference {}: {:?}", name, outcome),
                        Err(e) => log::warn!("Ignoring external preference: {}", e),
                    }
                }
                PreferenceEvent::ReloadError(e) => {
                    log::warn!("Failed to reload preferences: {}", e);
                }
            }
        }
    }

    /// Window title: glitch headline, typed tagline and the active theme
    pub fn title(&self) -> String {
        let theme = self.controller.theme();
        let marker = match self.document.overlay() {
            OverlayState::Hidden => "",
            OverlayState::Active | OverlayState::Fading => " ...",
        };
        format!(
            "{} // {}_ [{}{}]",
            self.glitch.text(),
            self.typing.text(),
            theme.name,
            marker
        )
    }

    /// Earliest pending timer across the controller, glitch and typing
    pub fn next_deadline(&self) -> Option<Duration> {
        [
            self.controller.next_deadline(),
            self.glitch.next_deadline(),
            self.typing.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Cancel every timer and detach the scene from the frame clock
    pub fn shutdown(&mut self) {
        self.controller.unmount();
        self.glitch.unmount();
        self.typing.stop();
        self.frame_subscription = None;
        log::info!("Scene unmounted");
    }

    pub fn composer(&self) -> Ref<'_, SceneComposer> {
        self.composer.borrow()
    }

    pub fn controller(&self) -> &ThemeController {
        &self.controller
    }

    pub fn document(&self) -> &StyleDocument {
        &self.document
    }

    pub fn glitch(&self) -> &GlitchText {
        &self.glitch
    }

    pub fn typing(&self) -> &TypingAnimation {
        &self.typing
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }
}
