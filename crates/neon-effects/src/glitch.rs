//! Glitch text engine
//!
//! A session scrambles a headline for a fixed number of frames, then waits a
//! short settle delay and restores the exact source text. Sessions start from
//! a recurring auto-trigger or from a hover; at most one runs at a time.
//! All timing flows through a [`Scheduler`] driven by the host's clock.

use std::time::Duration;

use neon_core::{Scheduler, TaskId};
use neon_theme::{GlitchLevel, ThemeDefinition};
use rand::Rng;
use rand::rngs::StdRng;

use crate::effects::make_rng;

/// Punctuation replacement set
pub const SYMBOL_CHARS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?~`";

/// Katakana and binary replacement set
pub const MATRIX_CHARS: &str =
    "アイウエオカキクケコサシスセソタチツテトナニヌネノハヒフヘホマミムメモヤユヨラリルレロワヲン01";

/// Pause between the last scrambled frame and the restore
pub const SETTLE_DELAY: Duration = Duration::from_millis(50);

/// Default period of the auto-trigger before jitter
pub const DEFAULT_AUTO_INTERVAL: Duration = Duration::from_millis(3000);

/// Per-level session tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlitchTuning {
    /// Total length of the scrambled phase
    pub duration: Duration,
    /// Chance each character is replaced in a frame
    pub probability: f64,
    /// Cap on replacements per frame
    pub max_replacements: usize,
    /// Scrambled frames per session
    pub frames: u32,
}

impl GlitchTuning {
    pub fn for_level(level: GlitchLevel) -> Self {
        let (duration_ms, probability, max_replacements, frames) = match level {
            GlitchLevel::Low => (80, 0.08, 1, 4),
            GlitchLevel::Medium => (150, 0.15, 3, 4),
            GlitchLevel::High => (250, 0.3, 6, 6),
            GlitchLevel::Extreme => (400, 0.5, 10, 8),
        };
        Self {
            duration: Duration::from_millis(duration_ms),
            probability,
            max_replacements,
            frames,
        }
    }

    /// Time between scrambled frames
    pub fn frame_interval(&self) -> Duration {
        self.duration / self.frames.max(1)
    }

    /// Upper bound of the random jitter added to the auto-trigger period
    pub fn auto_jitter(level: GlitchLevel) -> Duration {
        match level {
            GlitchLevel::Extreme => Duration::from_millis(1000),
            _ => Duration::from_millis(2000),
        }
    }
}

/// Scramble `source` once
///
/// Characters are visited left to right; each is replaced with probability
/// `tuning.probability` until `tuning.max_replacements` have been made.
pub fn scramble(source: &str, tuning: &GlitchTuning, rng: &mut impl Rng) -> String {
    let mut replaced = 0;
    source
        .chars()
        .map(|c| {
            if replaced < tuning.max_replacements
                && rng.gen_bool(tuning.probability.clamp(0.0, 1.0))
            {
                replaced += 1;
                random_glyph(rng)
            } else {
                c
            }
        })
        .collect()
}

fn random_glyph(rng: &mut impl Rng) -> char {
    let set = if rng.gen_bool(0.5) { MATRIX_CHARS } else { SYMBOL_CHARS };
    let count = set.chars().count();
    set.chars().nth(rng.gen_range(0..count)).unwrap_or('#')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GlitchStep {
    Frame,
    Restore,
    AutoTrigger,
}

/// Scrambling headline with auto and hover triggers
pub struct GlitchText {
    source: String,
    rendered: String,
    level: GlitchLevel,
    active: bool,
    frames_done: u32,
    /// Tuning captured when the running session started
    session: GlitchTuning,
    auto_interval: Option<Duration>,
    auto_task: Option<TaskId>,
    scheduler: Scheduler<GlitchStep>,
    mounted: bool,
    rng: StdRng,
}

impl GlitchText {
    pub fn new(text: impl Into<String>, level: GlitchLevel, seed: Option<u64>) -> Self {
        let source = text.into();
        Self {
            rendered: source.clone(),
            source,
            level,
            active: false,
            frames_done: 0,
            session: GlitchTuning::for_level(level),
            auto_interval: None,
            auto_task: None,
            scheduler: Scheduler::new(),
            mounted: true,
            rng: make_rng(seed),
        }
    }

    /// Enable the recurring trigger with `base` as the period before jitter
    ///
    /// Takes effect at [`start`](Self::start).
    pub fn with_auto_trigger(mut self, base: Duration) -> Self {
        self.auto_interval = Some(base);
        self
    }

    /// Arm the auto-trigger relative to `now`
    pub fn start(&mut self, now: Duration) {
        self.schedule_auto(now);
    }

    fn schedule_auto(&mut self, now: Duration) {
        if let Some(task) = self.auto_task.take() {
            self.scheduler.cancel(task);
        }
        let Some(base) = self.auto_interval else {
            return;
        };
        if !self.mounted {
            return;
        }
        let jitter = GlitchTuning::auto_jitter(self.level).mul_f64(self.rng.gen_range(0.0..1.0));
        self.auto_task = Some(self.scheduler.schedule(now, base + jitter, GlitchStep::AutoTrigger));
    }

    /// Start a session; returns false if one is already running
    pub fn trigger(&mut self, now: Duration) -> bool {
        if !self.mounted || self.active {
            return false;
        }
        self.active = true;
        self.frames_done = 0;
        self.session = GlitchTuning::for_level(self.level);
        self.scheduler.schedule(now, self.session.frame_interval(), GlitchStep::Frame);
        log::debug!("Glitch session started at level {}", self.level.as_str());
        true
    }

    /// Pointer entered the headline
    pub fn hover(&mut self, now: Duration) -> bool {
        self.trigger(now)
    }

    /// Run everything due at `now`; returns true if the rendered text changed
    pub fn tick(&mut self, now: Duration) -> bool {
        if !self.mounted {
            return false;
        }

        let before = self.rendered.clone();
        while let Some((due, step)) = self.scheduler.pop_due(now) {
            match step {
                GlitchStep::Frame => {
                    self.rendered = scramble(&self.source, &self.session, &mut self.rng);
                    self.frames_done += 1;
                    if self.frames_done >= self.session.frames {
                        self.scheduler.schedule(due, SETTLE_DELAY, GlitchStep::Restore);
                    } else {
                        self.scheduler
                            .schedule(due, self.session.frame_interval(), GlitchStep::Frame);
                    }
                }
                GlitchStep::Restore => {
                    self.rendered = self.source.clone();
                    self.active = false;
                }
                GlitchStep::AutoTrigger => {
                    self.auto_task = None;
                    self.trigger(due);
                    self.schedule_auto(due);
                }
            }
        }
        self.rendered != before
    }

    /// Switch level; re-arms the auto-trigger with the new jitter
    pub fn set_level(&mut self, level: GlitchLevel, now: Duration) {
        if level == self.level {
            return;
        }
        self.level = level;
        if self.auto_task.is_some() {
            self.schedule_auto(now);
        }
    }

    pub fn apply_theme(&mut self, theme: &ThemeDefinition, now: Duration) {
        self.set_level(theme.effects.glitch_level, now);
    }

    /// Replace the source text; shown immediately unless a session is running
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.source = text.into();
        if !self.active {
            self.rendered = self.source.clone();
        }
    }

    /// Cancel every pending step and show the source text
    pub fn unmount(&mut self) {
        self.scheduler.clear();
        self.auto_task = None;
        self.active = false;
        self.mounted = false;
        self.rendered = self.source.clone();
    }

    pub fn text(&self) -> &str {
        &self.rendered
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn level(&self) -> GlitchLevel {
        self.level
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }
}
