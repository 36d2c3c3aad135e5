//! Common test utilities and harness
//!
//! Provides reusable utilities for functional testing including:
//! - Test environment setup (temp config directory, preference file)
//! - Showcase construction against that environment
//! - Timing helpers

#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use neon_config::{Config, FilePreferenceStore, PreferenceStore};
use neonfolio::Showcase;
use tempfile::TempDir;

/// Test environment with isolated config directory
pub struct TestEnvironment {
    /// Temporary directory for test config
    pub temp_dir: TempDir,
    /// Path to the config directory
    pub config_dir: PathBuf,
}

impl TestEnvironment {
    /// Create a new isolated test environment
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config_dir = temp_dir.path().to_path_buf();

        Self {
            temp_dir,
            config_dir,
        }
    }

    /// Write a test config file
    pub fn write_config(&self, content: &str) {
        let config_path = self.config_dir.join("config.toml");
        std::fs::write(&config_path, content).expect("Failed to write test config");
    }

    /// Load config.toml, creating the default file when missing
    pub fn load_config(&self) -> Config {
        Config::load_in(&self.config_dir).expect("Failed to load test config")
    }

    pub fn preferences_path(&self) -> PathBuf {
        Config::preferences_path_in(&self.config_dir)
    }

    /// Write the preference file with a raw theme value
    pub fn write_preference(&self, theme: &str) {
        std::fs::write(
            self.preferences_path(),
            format!("portfolio-theme = \"{}\"\n", theme),
        )
        .expect("Failed to write test preference");
    }

    pub fn preference_store(&self) -> FilePreferenceStore {
        FilePreferenceStore::new(self.preferences_path())
    }

    /// Stored theme value, read back through a fresh store
    pub fn stored_theme(&self) -> Option<String> {
        self.preference_store().load_theme()
    }

    /// A small, seeded showcase using this environment's preference file
    pub fn showcase(&self) -> Showcase {
        Showcase::new(&small_config(), Box::new(self.preference_store()), None)
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

/// Seeded config with a scene small enough for fast tests
pub fn small_config() -> Config {
    let mut config = Config::default();
    config.general.seed = Some(42);
    config.scene.particle_count = Some(300);
    config.scene.matrix_columns = 6;
    config.scene.matrix_rows = 12;
    config.scene.geometry_count = 3;
    config.glitch.auto_trigger = false;
    config
}

pub fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

/// Tick `showcase` every `step` ms from `from` through `to` inclusive
pub fn run_frames(showcase: &mut Showcase, from: u64, to: u64, step: u64) {
    let mut t = from;
    while t <= to {
        showcase.tick(ms(t));
        t += step;
    }
}
