//! Preference Hot-Reload
//!
//! Watches preferences.toml for edits made outside the running process and
//! forwards the new theme id through a channel for the application to apply.

use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use crate::preferences::FilePreferenceStore;
use crate::{Config, ConfigError};

/// Events emitted by the preference watcher
#[derive(Debug, Clone, PartialEq)]
pub enum PreferenceEvent {
    /// The stored theme id changed; the value is not validated
    ThemeChanged(String),
    /// The file was written but could not be read
    ReloadError(String),
}

/// Watches the preference file for changes
pub struct PreferenceWatcher {
    _watcher: RecommendedWatcher,
    receiver: Receiver<PreferenceEvent>,
    path: PathBuf,
}

impl PreferenceWatcher {
    /// Watch the default preference file
    pub fn new() -> Result<Self, ConfigError> {
        PreferenceWatcherBuilder::new().build(&Config::preferences_path()?)
    }

    /// Watch a specific preference file with the default debounce
    pub fn watch(path: &Path) -> Result<Self, ConfigError> {
        PreferenceWatcherBuilder::new().build(path)
    }

    fn spawn(path: &Path, debounce: Duration) -> Result<Self, ConfigError> {
        let (tx, rx) = mpsc::channel();

        let watch_dir = path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| ConfigError::WatchError(format!("{:?} has no parent", path)))?;
        std::fs::create_dir_all(&watch_dir)
            .map_err(|e| ConfigError::CreateDirError(watch_dir.clone(), e))?;

        let target = path.to_path_buf();
        let mut last_event: Option<Instant> = None;
        let mut last_value: Option<String> = None;

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| match result {
                Ok(event) => {
                    if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                        return;
                    }
                    if !event.paths.iter().any(|p| p.file_name() == target.file_name()) {
                        return;
                    }

                    // Debounce; the window opens only on a successful read
                    let now = Instant::now();
                    if let Some(last) = last_event {
                        if now.duration_since(last) < debounce {
                            return;
                        }
                    }

                    match std::fs::read_to_string(&target) {
                        Ok(content) => {
                            let Some(theme) = FilePreferenceStore::parse(&content) else {
                                return;
                            };
                            last_event = Some(now);
                            // Our own writes echo back here; only report real changes
                            if last_value.as_deref() == Some(theme.as_str()) {
                                return;
                            }
                            log::info!("Preference file changed: theme = {}", theme);
                            last_value = Some(theme.clone());
                            let _ = tx.send(PreferenceEvent::ThemeChanged(theme));
                        }
                        Err(e) => {
                            log::error!("Failed to reload preferences: {}", e);
                            let _ = tx.send(PreferenceEvent::ReloadError(e.to_string()));
                        }
                    }
                }
                Err(e) => {
                    log::error!("Watch error: {:?}", e);
                }
            },
            NotifyConfig::default().with_poll_interval(Duration::from_secs(1)),
        )
        .map_err(|e| ConfigError::WatchError(e.to_string()))?;

        watcher
            .watch(&watch_dir, RecursiveMode::NonRecursive)
            .map_err(|e| ConfigError::WatchError(e.to_string()))?;
        log::info!("Watching preference file: {:?}", path);

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&self) -> Option<PreferenceEvent> {
        self.receiver.try_recv().ok()
    }

    /// Get all pending events
    pub fn drain_events(&self) -> Vec<PreferenceEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Builder for creating a PreferenceWatcher with custom options
pub struct PreferenceWatcherBuilder {
    debounce_ms: u64,
}

impl Default for PreferenceWatcherBuilder {
    fn default() -> Self {
        Self { debounce_ms: 100 }
    }
}

impl PreferenceWatcherBuilder {
    /// Create a new builder with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set debounce duration in milliseconds
    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Build the watcher for `path`
    pub fn build(self, path: &Path) -> Result<PreferenceWatcher, ConfigError> {
        PreferenceWatcher::spawn(path, Duration::from_millis(self.debounce_ms))
    }
}
