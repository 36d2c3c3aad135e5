//! Neonfolio Configuration Management
//!
//! Handles loading and managing configuration from ~/.neonfolio/config.toml,
//! the durable theme preference, and hot-reload of that preference.

pub mod preferences;
pub mod watcher;

pub use preferences::{
    FilePreferenceStore, MemoryPreferenceStore, PreferenceStore, PREFERENCE_KEY,
};
pub use watcher::{PreferenceEvent, PreferenceWatcher, PreferenceWatcherBuilder};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration directory name
const CONFIG_DIR_NAME: &str = ".neonfolio";
/// Default configuration file name
const CONFIG_FILE_NAME: &str = "config.toml";
/// Durable preference file name
const PREFERENCES_FILE_NAME: &str = "preferences.toml";
/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "NEONFOLIO_CONFIG_DIR";

/// General configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Theme used when no preference has been saved yet
    #[serde(default = "default_theme")]
    pub theme: String,

    /// Seed for every random source; unset means entropy
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_theme() -> String {
    "neutral".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            seed: None,
        }
    }
}

/// Animated scene configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Overrides the active theme's particle count
    #[serde(default)]
    pub particle_count: Option<usize>,

    /// Base radius of the innermost particle shell
    #[serde(default = "default_particle_spread")]
    pub particle_spread: f32,

    /// Matrix rain columns
    #[serde(default = "default_matrix_columns")]
    pub matrix_columns: usize,

    /// Matrix rain rows
    #[serde(default = "default_matrix_rows")]
    pub matrix_rows: usize,

    /// Matrix rain base speed in rows per frame at 60 fps
    #[serde(default = "default_matrix_speed")]
    pub matrix_speed: f32,

    /// Floating geometry item count
    #[serde(default = "default_geometry_count")]
    pub geometry_count: usize,

    /// Floating geometry spread (cube side)
    #[serde(default = "default_geometry_spread")]
    pub geometry_spread: f32,

    /// Floating geometry speed
    #[serde(default = "default_geometry_speed")]
    pub geometry_speed: f32,

    /// Enable the orbiting camera
    #[serde(default = "default_camera_movement")]
    pub camera_movement: bool,
}

fn default_particle_spread() -> f32 {
    30.0
}

fn default_matrix_columns() -> usize {
    30
}

fn default_matrix_rows() -> usize {
    50
}

fn default_matrix_speed() -> f32 {
    0.02
}

fn default_geometry_count() -> usize {
    15
}

fn default_geometry_spread() -> f32 {
    30.0
}

fn default_geometry_speed() -> f32 {
    0.01
}

fn default_camera_movement() -> bool {
    true
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            particle_count: None,
            particle_spread: default_particle_spread(),
            matrix_columns: default_matrix_columns(),
            matrix_rows: default_matrix_rows(),
            matrix_speed: default_matrix_speed(),
            geometry_count: default_geometry_count(),
            geometry_spread: default_geometry_spread(),
            geometry_speed: default_geometry_speed(),
            camera_movement: default_camera_movement(),
        }
    }
}

/// Glitch headline configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlitchConfig {
    /// Headline text the glitch effect runs on
    #[serde(default = "default_glitch_text")]
    pub text: String,

    /// Trigger glitches on a randomized timer
    #[serde(default = "default_auto_trigger")]
    pub auto_trigger: bool,

    /// Minimum delay between automatic glitches in milliseconds
    #[serde(default = "default_base_interval")]
    pub base_interval_ms: u64,
}

fn default_glitch_text() -> String {
    "CYBER_SECURITY".to_string()
}

fn default_auto_trigger() -> bool {
    true
}

fn default_base_interval() -> u64 {
    3000
}

impl Default for GlitchConfig {
    fn default() -> Self {
        Self {
            text: default_glitch_text(),
            auto_trigger: default_auto_trigger(),
            base_interval_ms: default_base_interval(),
        }
    }
}

/// Typing animation configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingConfig {
    /// Lines typed in sequence
    #[serde(default = "default_typing_lines")]
    pub lines: Vec<String>,

    /// Delay per typed character in milliseconds
    #[serde(default = "default_typing_speed")]
    pub speed_ms: u64,

    /// Delay before the first character in milliseconds
    #[serde(default)]
    pub initial_delay_ms: u64,

    /// Delete and retype lines forever
    #[serde(default = "default_typing_loop", rename = "loop")]
    pub loop_lines: bool,

    /// Pause at a fully typed line before deleting, in milliseconds
    #[serde(default = "default_loop_delay")]
    pub loop_delay_ms: u64,
}

fn default_typing_lines() -> Vec<String> {
    vec![
        "GRC Analyst".to_string(),
        "Penetration Tester".to_string(),
        "Security Architect".to_string(),
    ]
}

fn default_typing_speed() -> u64 {
    50
}

fn default_typing_loop() -> bool {
    true
}

fn default_loop_delay() -> u64 {
    2000
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            lines: default_typing_lines(),
            speed_ms: default_typing_speed(),
            initial_delay_ms: 0,
            loop_lines: default_typing_loop(),
            loop_delay_ms: default_loop_delay(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Animated scene settings
    #[serde(default)]
    pub scene: SceneConfig,

    /// Glitch headline settings
    #[serde(default)]
    pub glitch: GlitchConfig,

    /// Typing animation settings
    #[serde(default)]
    pub typing: TypingConfig,
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_in(&Self::config_dir()?)
    }

    /// Load `config.toml` from `dir`, creating a default file if missing
    pub fn load_in(dir: &Path) -> Result<Self, ConfigError> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            log::info!("Config file not found, creating default at {:?}", config_path);
            Self::create_default_config(dir)?;
        }

        let config = Self::load_from(&config_path)?;
        log::info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e))?;

        Ok(config)
    }

    /// Get the configuration directory path
    ///
    /// `$NEONFOLIO_CONFIG_DIR` when set, otherwise `~/.neonfolio/`.
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
        Ok(home.join(CONFIG_DIR_NAME))
    }

    /// Get the configuration file path
    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Get the durable preference file path
    pub fn preferences_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join(PREFERENCES_FILE_NAME))
    }

    /// Preference file path inside an explicit directory
    pub fn preferences_path_in(dir: &Path) -> PathBuf {
        dir.join(PREFERENCES_FILE_NAME)
    }

    /// Create the default configuration file and directory
    pub fn create_default_config(dir: &Path) -> Result<(), ConfigError> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDirError(dir.to_path_buf(), e))?;

        let default_config = Config::default();
        let toml_content =
            toml::to_string_pretty(&default_config).map_err(ConfigError::SerializeError)?;

        // Add header comment
        let content = format!(
            "# Neonfolio Configuration\n\
             #\n\
             # general.theme is used until a theme is picked at runtime\n\
             # (one of: neutral, rogue, secure, zeus). The picked theme is\n\
             # saved to preferences.toml next to this file.\n\
             \n\
             {toml_content}"
        );

        fs::write(&config_path, content)
            .map_err(|e| ConfigError::WriteError(config_path.clone(), e))?;

        log::info!("Created default configuration at {:?}", config_path);
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    /// Home directory not found
    NoHomeDirectory,
    /// Failed to read config file
    ReadError(PathBuf, std::io::Error),
    /// Failed to parse config file
    ParseError(PathBuf, toml::de::Error),
    /// Failed to serialize config
    SerializeError(toml::ser::Error),
    /// Failed to write config file
    WriteError(PathBuf, std::io::Error),
    /// Failed to create directory
    CreateDirError(PathBuf, std::io::Error),
    /// Failed to set up file watcher
    WatchError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoHomeDirectory => write!(f, "Could not determine home directory"),
            ConfigError::ReadError(path, e) => write!(f, "Failed to read {:?}: {}", path, e),
            ConfigError::ParseError(path, e) => write!(f, "Failed to parse {:?}: {}", path, e),
            ConfigError::SerializeError(e) => write!(f, "Failed to serialize config: {}", e),
            ConfigError::WriteError(path, e) => write!(f, "Failed to write {:?}: {}", path, e),
            ConfigError::CreateDirError(path, e) => write!(f, "Failed to create {:?}: {}", path, e),
            ConfigError::WatchError(e) => write!(f, "Failed to watch files: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.theme, "neutral");
        assert_eq!(config.general.seed, None);
        assert_eq!(config.scene.matrix_columns, 30);
        assert_eq!(config.scene.matrix_rows, 50);
        assert_eq!(config.scene.geometry_count, 15);
        assert_eq!(config.typing.speed_ms, 50);
        assert_eq!(config.typing.loop_delay_ms, 2000);
        assert!(config.scene.camera_movement);
    }

    #[test]
    fn test_serialize_deserialize() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.general.theme, config.general.theme);
        assert_eq!(parsed.typing.lines, config.typing.lines);
        assert_eq!(parsed.scene.matrix_speed, config.scene.matrix_speed);
    }

    #[test]
    fn test_partial_config() {
        let partial = r#"
            [general]
            theme = "rogue"
            seed = 42

            [typing]
            loop = false
        "#;
        let config: Config = toml::from_str(partial).unwrap();
        assert_eq!(config.general.theme, "rogue");
        assert_eq!(config.general.seed, Some(42));
        assert!(!config.typing.loop_lines);
        // Other fields should have defaults
        assert_eq!(config.glitch.base_interval_ms, 3000);
        assert_eq!(config.scene.particle_count, None);
    }

    #[test]
    fn test_load_in_creates_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_in(dir.path()).unwrap();
        assert_eq!(config.general.theme, "neutral");

        let written = fs::read_to_string(dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert!(written.starts_with("# Neonfolio Configuration"));
        assert!(written.contains("[scene]"));
    }

    #[test]
    fn test_load_in_reports_parse_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "[general\ntheme = ").unwrap();
        let err = Config::load_in(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_, _)));
        assert!(err.to_string().starts_with("Failed to parse"));
    }
}
