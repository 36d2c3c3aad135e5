//! Typewriter reveal
//!
//! Types one character per interval, then either reports completion or, when
//! looping over several lines, pauses, deletes backward at twice the speed
//! and moves on to the next line.

use std::time::Duration;

use neon_core::Scheduler;

/// Typing configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TypingOptions {
    pub lines: Vec<String>,
    /// Interval per typed character; deleting runs at half this
    pub speed: Duration,
    /// Extra wait before the very first character
    pub initial_delay: Duration,
    pub looping: bool,
    /// Pause on a fully typed line before deleting
    pub loop_delay: Duration,
}

impl Default for TypingOptions {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            speed: Duration::from_millis(50),
            initial_delay: Duration::ZERO,
            looping: false,
            loop_delay: Duration::from_millis(2000),
        }
    }
}

/// Reveal phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingPhase {
    Idle,
    Typing,
    Paused,
    Deleting,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypingStep {
    Type,
    StartDeleting,
    Delete,
}

pub struct TypingAnimation {
    lines: Vec<Vec<char>>,
    options: TypingOptions,
    line: usize,
    /// Characters of the current line shown
    shown: usize,
    phase: TypingPhase,
    scheduler: Scheduler<TypingStep>,
    on_complete: Option<Box<dyn FnMut()>>,
}

/// Floor on the per-character interval so every step moves time forward
const MIN_SPEED: Duration = Duration::from_millis(1);

impl TypingAnimation {
    pub fn new(mut options: TypingOptions) -> Self {
        let mut lines: Vec<Vec<char>> =
            options.lines.iter().map(|l| l.chars().collect()).collect();
        if lines.is_empty() {
            lines.push(Vec::new());
        }
        if options.speed < MIN_SPEED {
            log::warn!("Typing speed {:?} too fast, using {:?}", options.speed, MIN_SPEED);
            options.speed = MIN_SPEED;
        }
        Self {
            lines,
            options,
            line: 0,
            shown: 0,
            phase: TypingPhase::Idle,
            scheduler: Scheduler::new(),
            on_complete: None,
        }
    }

    /// Called once when a non-looping reveal finishes
    pub fn on_complete(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Begin typing; the first character lands after `initial_delay + speed`
    pub fn start(&mut self, now: Duration) {
        if self.phase != TypingPhase::Idle {
            return;
        }
        self.phase = TypingPhase::Typing;
        self.scheduler
            .schedule(now, self.options.initial_delay + self.options.speed, TypingStep::Type);
    }

    fn loops(&self) -> bool {
        self.options.looping && self.lines.len() > 1
    }

    /// Run everything due at `now`; returns true if the visible text changed
    pub fn tick(&mut self, now: Duration) -> bool {
        let mut changed = false;
        while let Some((due, step)) = self.scheduler.pop_due(now) {
            let len = self.lines[self.line].len();
            match step {
                TypingStep::Type => {
                    if self.shown < len {
                        self.shown += 1;
                        changed = true;
                        self.scheduler.schedule(due, self.options.speed, TypingStep::Type);
                    } else if self.loops() {
                        self.phase = TypingPhase::Paused;
                        self.scheduler
                            .schedule(due, self.options.loop_delay, TypingStep::StartDeleting);
                    } else {
                        self.phase = TypingPhase::Completed;
                        if !self.options.looping {
                            if let Some(callback) = self.on_complete.as_mut() {
                                callback();
                            }
                        }
                    }
                }
                TypingStep::StartDeleting => {
                    self.phase = TypingPhase::Deleting;
                    self.scheduler.schedule(due, self.options.speed / 2, TypingStep::Delete);
                }
                TypingStep::Delete => {
                    if self.shown > 0 {
                        self.shown -= 1;
                        changed = true;
                        self.scheduler.schedule(due, self.options.speed / 2, TypingStep::Delete);
                    } else {
                        self.line = (self.line + 1) % self.lines.len();
                        self.phase = TypingPhase::Typing;
                        self.scheduler.schedule(due, self.options.speed, TypingStep::Type);
                    }
                }
            }
        }
        changed
    }

    /// Visible prefix of the current line
    pub fn text(&self) -> String {
        self.lines[self.line][..self.shown].iter().collect()
    }

    pub fn phase(&self) -> TypingPhase {
        self.phase
    }

    pub fn line_index(&self) -> usize {
        self.line
    }

    pub fn is_complete(&self) -> bool {
        self.phase == TypingPhase::Completed
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    /// Drop pending steps; the visible text freezes
    pub fn stop(&mut self) {
        self.scheduler.clear();
    }
}
