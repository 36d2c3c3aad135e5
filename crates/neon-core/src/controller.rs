//! Theme controller
//!
//! Single writer of the active theme. A switch runs a fixed three-phase
//! sequence on the [`Scheduler`]:
//!
//! 1. start: overlay shown, transition class added
//! 2. +300 ms: theme committed, preference saved, stylesheet replaced
//! 3. +200 ms: overlay fades out
//! 4. +800 ms: transition class removed, controller idle again
//!
//! While a sequence is in flight every further `set_theme` is a no-op.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use log::{debug, info, warn};
use neon_config::PreferenceStore;
use neon_theme::{emit_css, get_theme, Color, ThemeDefinition, ThemeError, ThemeId};

use crate::scheduler::Scheduler;

/// Where the controller writes its visible side effects
pub trait StyleSurface {
    /// Replace all previously installed theme CSS with `css`
    fn replace_theme_css(&mut self, css: &str);

    /// Toggle the transition class on the document body
    fn set_transition_class(&mut self, active: bool);

    fn set_overlay(&mut self, state: OverlayState);

    fn set_favicon(&mut self, color: Color);

    /// Screen-reader status message
    fn announce(&mut self, message: &str);
}

/// Switch overlay visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayState {
    #[default]
    Hidden,
    /// Fully shown at the start of a switch
    Active,
    /// Fading out after the commit
    Fading,
}

/// Observable controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeState {
    Idle(ThemeId),
    Transitioning { from: ThemeId, to: ThemeId },
}

/// Notifications delivered to subscribers after each phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeEvent {
    TransitionStarted { from: ThemeId, to: ThemeId },
    /// The new theme is now current; re-read colors and effects
    ThemeCommitted(ThemeId),
    TransitionFinished(ThemeId),
}

/// Result of a `set_theme` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    Started,
    /// Target is already the current theme
    AlreadyActive,
    /// Another transition is in flight
    Busy,
    /// The controller has been unmounted
    Unmounted,
}

/// Phase delays of a switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionTimings {
    pub commit_delay: Duration,
    pub fade_delay: Duration,
    pub clear_delay: Duration,
}

impl Default for TransitionTimings {
    fn default() -> Self {
        Self {
            commit_delay: Duration::from_millis(300),
            fade_delay: Duration::from_millis(200),
            clear_delay: Duration::from_millis(800),
        }
    }
}

impl TransitionTimings {
    /// Start-to-idle duration
    pub fn total(&self) -> Duration {
        self.commit_delay + self.fade_delay + self.clear_delay
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransitionStep {
    Commit(ThemeId),
    FadeOverlay,
    Finish,
}

/// Receives [`ThemeEvent`]s; dropping it unsubscribes
pub struct ThemeSubscription {
    receiver: Receiver<ThemeEvent>,
}

impl ThemeSubscription {
    pub fn try_recv(&self) -> Option<ThemeEvent> {
        self.receiver.try_recv().ok()
    }

    pub fn drain(&self) -> Vec<ThemeEvent> {
        self.receiver.try_iter().collect()
    }
}

/// Owns the active theme and its transition state machine
pub struct ThemeController {
    current: ThemeId,
    /// `(from, to)` of the switch in flight
    transition: Option<(ThemeId, ThemeId)>,
    store: Box<dyn PreferenceStore>,
    surface: Box<dyn StyleSurface>,
    scheduler: Scheduler<TransitionStep>,
    subscribers: Vec<Sender<ThemeEvent>>,
    timings: TransitionTimings,
    mounted: bool,
}

impl ThemeController {
    /// Start on the persisted theme, or neutral
    pub fn new(store: Box<dyn PreferenceStore>, surface: Box<dyn StyleSurface>) -> Self {
        Self::with_default(store, surface, ThemeId::default())
    }

    /// Start on the persisted theme, or `default` when none is valid
    pub fn with_default(
        store: Box<dyn PreferenceStore>,
        surface: Box<dyn StyleSurface>,
        default: ThemeId,
    ) -> Self {
        let initial = restore_theme(store.as_ref(), default);
        let mut controller = Self {
            current: initial,
            transition: None,
            store,
            surface,
            scheduler: Scheduler::new(),
            subscribers: Vec::new(),
            timings: TransitionTimings::default(),
            mounted: true,
        };
        controller.apply_theme(initial);
        info!("Theme controller started on {}", initial);
        controller
    }

    /// Override the phase delays
    pub fn with_timings(mut self, timings: TransitionTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn state(&self) -> ThemeState {
        match self.transition {
            None => ThemeState::Idle(self.current),
            Some((from, to)) => ThemeState::Transitioning { from, to },
        }
    }

    /// The committed theme; during a transition this flips at the commit phase
    pub fn current_theme(&self) -> ThemeId {
        self.current
    }

    pub fn theme(&self) -> &'static ThemeDefinition {
        get_theme(self.current_theme())
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn timings(&self) -> TransitionTimings {
        self.timings
    }

    /// Register for theme events
    pub fn subscribe(&mut self) -> ThemeSubscription {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        ThemeSubscription { receiver: rx }
    }

    /// Begin switching to `target` at host time `now`
    pub fn set_theme(&mut self, target: ThemeId, now: Duration) -> SwitchOutcome {
        if !self.mounted {
            return SwitchOutcome::Unmounted;
        }
        if self.transition.is_some() {
            debug!("Ignoring switch to {}: transition in flight", target);
            return SwitchOutcome::Busy;
        }
        if self.current == target {
            return SwitchOutcome::AlreadyActive;
        }

        let from = self.current;
        self.transition = Some((from, target));
        self.surface.set_overlay(OverlayState::Active);
        self.surface.set_transition_class(true);
        self.scheduler
            .schedule(now, self.timings.commit_delay, TransitionStep::Commit(target));
        debug!("Transition {} -> {} started", from, target);
        self.notify(ThemeEvent::TransitionStarted { from, to: target });
        SwitchOutcome::Started
    }

    /// String boundary for `set_theme`; unknown names change nothing
    pub fn set_theme_by_name(
        &mut self,
        name: &str,
        now: Duration,
    ) -> Result<SwitchOutcome, ThemeError> {
        let target = name.parse::<ThemeId>()?;
        Ok(self.set_theme(target, now))
    }

    /// Run every phase due at or before `now`
    pub fn tick(&mut self, now: Duration) {
        while let Some((due, step)) = self.scheduler.pop_due(now) {
            self.run_step(step, due);
        }
    }

    /// Time of the next pending phase
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    /// Cancel pending phases; later ticks and switches do nothing
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        let pending = self.scheduler.len();
        self.scheduler.clear();
        self.mounted = false;
        info!("Theme controller unmounted ({} pending phases dropped)", pending);
    }

    fn run_step(&mut self, step: TransitionStep, due: Duration) {
        match step {
            TransitionStep::Commit(target) => {
                self.current = target;
                if let Err(e) = self.store.save_theme(target.as_str()) {
                    warn!("Failed to persist theme preference: {}", e);
                }
                self.apply_theme(target);
                info!("Theme committed: {}", target);
                self.notify(ThemeEvent::ThemeCommitted(target));
                self.scheduler
                    .schedule(due, self.timings.fade_delay, TransitionStep::FadeOverlay);
            }
            TransitionStep::FadeOverlay => {
                debug!("Transition overlay fading");
                self.surface.set_overlay(OverlayState::Fading);
                self.scheduler
                    .schedule(due, self.timings.clear_delay, TransitionStep::Finish);
            }
            TransitionStep::Finish => {
                let current = self.current;
                self.surface.set_overlay(OverlayState::Hidden);
                self.surface.set_transition_class(false);
                self.transition = None;
                debug!("Transition to {} finished", current);
                self.notify(ThemeEvent::TransitionFinished(current));
            }
        }
    }

    fn apply_theme(&mut self, id: ThemeId) {
        let theme = get_theme(id);
        self.surface.replace_theme_css(&emit_css(theme));
        self.surface.set_favicon(theme.favicon);
        self.surface.announce(&theme.announcement());
    }

    fn notify(&mut self, event: ThemeEvent) {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }
}

/// Read the persisted theme, falling back to `default` when absent or invalid
pub fn restore_theme(store: &dyn PreferenceStore, default: ThemeId) -> ThemeId {
    match store.load_theme() {
        None => default,
        Some(raw) => match raw.parse::<ThemeId>() {
            Ok(id) => {
                info!("Restored theme preference: {}", id);
                id
            }
            Err(e) => {
                warn!("{} in stored preference, using {}", e, default);
                default
            }
        },
    }
}

#[derive(Debug, Default)]
struct DocumentState {
    css: String,
    css_replacements: usize,
    transition_class: bool,
    overlay: OverlayState,
    favicon: Option<Color>,
    announcements: Vec<String>,
}

/// In-process style surface
///
/// Clones share state, so the host keeps a handle for drawing the overlay
/// while the controller owns another.
#[derive(Debug, Clone, Default)]
pub struct StyleDocument {
    inner: Rc<RefCell<DocumentState>>,
}

impl StyleDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently installed theme CSS
    pub fn css(&self) -> String {
        self.inner.borrow().css.clone()
    }

    /// How many times the theme CSS was replaced
    pub fn css_replacements(&self) -> usize {
        self.inner.borrow().css_replacements
    }

    pub fn transition_class(&self) -> bool {
        self.inner.borrow().transition_class
    }

    pub fn overlay(&self) -> OverlayState {
        self.inner.borrow().overlay
    }

    pub fn favicon(&self) -> Option<Color> {
        self.inner.borrow().favicon
    }

    pub fn announcements(&self) -> Vec<String> {
        self.inner.borrow().announcements.clone()
    }
}

impl StyleSurface for StyleDocument {
    fn replace_theme_css(&mut self, css: &str) {
        let mut inner = self.inner.borrow_mut();
        inner.css.clear();
        inner.css.push_str(css);
        inner.css_replacements += 1;
    }

    fn set_transition_class(&mut self, active: bool) {
        self.inner.borrow_mut().transition_class = active;
    }

    fn set_overlay(&mut self, state: OverlayState) {
        self.inner.borrow_mut().overlay = state;
    }

    fn set_favicon(&mut self, color: Color) {
        self.inner.borrow_mut().favicon = Some(color);
    }

    fn announce(&mut self, message: &str) {
        self.inner.borrow_mut().announcements.push(message.to_string());
    }
}
