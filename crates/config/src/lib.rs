//! Settings resolution for bugrelay.
//!
//! User preferences live in a TOML settings file behind a [`SettingsStore`];
//! deployment credentials ship in a read-only packaged JSON file
//! ([`DeploymentConstants`]) that overrides the stored values for the
//! endpoint, API key, and mailbox id. [`SettingsProvider`] merges the two and
//! enforces the fixed recording length.

pub mod constants;
pub mod error;
pub mod provider;
pub mod settings;
pub mod store;

pub use constants::DeploymentConstants;
pub use error::ConfigError;
pub use provider::SettingsProvider;
pub use settings::{
    AudioConstraints, CaptureConstraints, DEFAULT_MAX_FILE_SIZE, MAX_RECORDING_SECONDS, Settings,
    VideoQuality,
};
pub use store::{FileStore, MemoryStore, SettingsStore};
