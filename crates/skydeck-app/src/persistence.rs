//! Storage backends for the settings document.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use skydeck_core::SettingsError;

/// Whole-document storage used by [`crate::SettingsStore`].
pub trait SettingsBackend: Send {
    /// Stored document, or `None` if nothing has been saved yet.
    fn load(&self) -> Result<Option<String>, SettingsError>;

    /// Replace the stored document.
    fn save(&self, contents: &str) -> Result<(), SettingsError>;
}

/// JSON file at a fixed path; the parent directory is created on save.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsBackend for JsonFileBackend {
    fn load(&self) -> Result<Option<String>, SettingsError> {
        if !self.path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(&self.path)?))
    }

    fn save(&self, contents: &str) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

/// In-process backend. Clones share the same document.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    contents: Arc<Mutex<Option<String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Arc::new(Mutex::new(Some(contents.into()))),
        }
    }

    /// Last saved document
    pub fn contents(&self) -> Option<String> {
        self.contents.lock().clone()
    }
}

impl SettingsBackend for MemoryBackend {
    fn load(&self) -> Result<Option<String>, SettingsError> {
        Ok(self.contents.lock().clone())
    }

    fn save(&self, contents: &str) -> Result<(), SettingsError> {
        *self.contents.lock() = Some(contents.to_string());
        Ok(())
    }
}
