//! Durable theme preference
//!
//! A single key-value pair, `portfolio-theme`, read once when the theme
//! controller starts and written after every committed switch.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::{Config, ConfigError};

/// Key the theme id is stored under
pub const PREFERENCE_KEY: &str = "portfolio-theme";

/// Storage for the persisted theme id
///
/// Values are stored verbatim; validating them against the theme registry
/// is the reader's job.
pub trait PreferenceStore {
    /// Read the stored theme id, if any
    fn load_theme(&self) -> Option<String>;

    /// Persist a theme id
    fn save_theme(&mut self, theme: &str) -> Result<(), ConfigError>;
}

/// On-disk layout of preferences.toml
#[derive(Debug, Default, Serialize, Deserialize)]
struct PreferenceFile {
    #[serde(rename = "portfolio-theme", default, skip_serializing_if = "Option::is_none")]
    theme: Option<String>,
}

/// Preference store backed by a TOML file
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location (~/.neonfolio/preferences.toml)
    pub fn open_default() -> Result<Self, ConfigError> {
        Ok(Self::new(Config::preferences_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse a preference file body
    pub fn parse(content: &str) -> Option<String> {
        match toml::from_str::<PreferenceFile>(content) {
            Ok(file) => file.theme,
            Err(e) => {
                log::warn!("Ignoring malformed preference file: {}", e);
                None
            }
        }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load_theme(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Self::parse(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                log::warn!("Failed to read preferences {:?}: {}", self.path, e);
                None
            }
        }
    }

    fn save_theme(&mut self, theme: &str) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::CreateDirError(parent.to_path_buf(), e))?;
        }

        let file = PreferenceFile {
            theme: Some(theme.to_string()),
        };
        let content = toml::to_string(&file).map_err(ConfigError::SerializeError)?;
        fs::write(&self.path, content).map_err(|e| ConfigError::WriteError(self.path.clone(), e))?;

        log::debug!("Saved {} = {:?} to {:?}", PREFERENCE_KEY, theme, self.path);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    theme: Option<String>,
    writes: usize,
}

/// In-memory preference store
///
/// Clones share the same slot, so a test can keep a handle after moving
/// a clone into the controller.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a raw value (valid or not)
    pub fn with_value(theme: &str) -> Self {
        let store = Self::default();
        store.inner.borrow_mut().theme = Some(theme.to_string());
        store
    }

    /// Number of successful `save_theme` calls
    pub fn write_count(&self) -> usize {
        self.inner.borrow().writes
    }

    pub fn value(&self) -> Option<String> {
        self.inner.borrow().theme.clone()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load_theme(&self) -> Option<String> {
        self.value()
    }

    fn save_theme(&mut self, theme: &str) -> Result<(), ConfigError> {
        let mut inner = self.inner.borrow_mut();
        inner.theme = Some(theme.to_string());
        inner.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut store = FilePreferenceStore::new(dir.path().join("nested").join("prefs.toml"));
        assert_eq!(store.load_theme(), None);

        store.save_theme("secure").unwrap();
        assert_eq!(store.load_theme(), Some("secure".to_string()));

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("portfolio-theme = \"secure\""));
    }

    #[test]
    fn test_malformed_file_reads_as_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.toml");
        fs::write(&path, "portfolio-theme = [").unwrap();
        assert_eq!(FilePreferenceStore::new(&path).load_theme(), None);
    }

    #[test]
    fn test_unknown_values_are_returned_verbatim() {
        assert_eq!(
            FilePreferenceStore::parse("portfolio-theme = \"matrix\""),
            Some("matrix".to_string())
        );
        assert_eq!(FilePreferenceStore::parse(""), None);
    }

    #[test]
    fn test_memory_store_shares_state() {
        let handle = MemoryPreferenceStore::new();
        let mut moved = handle.clone();
        moved.save_theme("zeus").unwrap();
        assert_eq!(handle.value(), Some("zeus".to_string()));
        assert_eq!(handle.write_count(), 1);
    }
}
