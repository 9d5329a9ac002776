use std::path::PathBuf;
use std::sync::Mutex;

use tracing::debug;

use crate::error::ConfigError;
use crate::settings::Settings;

/// Persistence backend for user settings.
pub trait SettingsStore: Send + Sync {
    /// Load stored settings. A store with nothing persisted yet returns
    /// defaults.
    fn load(&self) -> Result<Settings, ConfigError>;

    /// Persist the given settings, replacing whatever was stored.
    fn save(&self, settings: &Settings) -> Result<(), ConfigError>;
}

/// TOML file-backed settings store.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store backed by the given file path. The file is created on
    /// first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl SettingsStore for FileStore {
    fn load(&self) -> Result<Settings, ConfigError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no settings file, using defaults");
            return Ok(Settings::default());
        }
        let text = std::fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&text)?)
    }

    fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let text = toml::to_string_pretty(settings)?;
        std::fs::write(&self.path, text)?;
        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}

/// In-memory settings store, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Settings>,
}

impl MemoryStore {
    /// Create a store holding default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given settings.
    #[must_use]
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            inner: Mutex::new(settings),
        }
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<Settings, ConfigError> {
        Ok(self
            .inner
            .lock()
            .map_err(|_| ConfigError::Validation("settings store poisoned".into()))?
            .clone())
    }

    fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        *self
            .inner
            .lock()
            .map_err(|_| ConfigError::Validation("settings store poisoned".into()))? =
            settings.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::VideoQuality;

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        let mut settings = store.load().unwrap();
        assert_eq!(settings, Settings::default());

        settings.default_assignee = "bugs@example.com".into();
        settings.video_quality = VideoQuality::High;
        store.save(&settings).unwrap();

        let back = store.load().unwrap();
        assert_eq!(back.default_assignee, "bugs@example.com");
        assert_eq!(back.video_quality, VideoQuality::High);
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = std::env::temp_dir().join(format!("bugrelay-store-{}", std::process::id()));
        let path = dir.join("settings.toml");
        let store = FileStore::new(&path);

        // Nothing persisted yet.
        assert_eq!(store.load().unwrap(), Settings::default());

        let settings = Settings {
            default_assignee: "bugs@example.com".into(),
            include_har: true,
            ..Settings::default()
        };
        store.save(&settings).unwrap();

        let back = store.load().unwrap();
        assert_eq!(back, settings);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn file_store_rejects_malformed_toml() {
        let dir = std::env::temp_dir().join(format!("bugrelay-store-bad-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");
        std::fs::write(&path, "not = [valid").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(store.load(), Err(ConfigError::Parse(_))));

        std::fs::remove_dir_all(&dir).ok();
    }
}
