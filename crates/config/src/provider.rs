use tracing::debug;

use crate::constants::DeploymentConstants;
use crate::error::ConfigError;
use crate::settings::{MAX_RECORDING_SECONDS, Settings, VideoQuality};
use crate::store::SettingsStore;

/// Resolves effective settings from a store plus the packaged deployment
/// constants.
///
/// Precedence: a non-empty constant wins over the stored value for the same
/// field, and the recording length is always pinned to
/// [`MAX_RECORDING_SECONDS`]. Saving goes the other way: constant-pinned
/// fields are stripped before persisting so the constants file stays the
/// single source of truth for them.
pub struct SettingsProvider {
    store: Box<dyn SettingsStore>,
    constants: DeploymentConstants,
}

impl SettingsProvider {
    /// Create a provider over the given store and constants.
    pub fn new(store: impl SettingsStore + 'static, constants: DeploymentConstants) -> Self {
        Self {
            store: Box::new(store),
            constants,
        }
    }

    /// The deployment constants in effect.
    pub fn constants(&self) -> &DeploymentConstants {
        &self.constants
    }

    /// Effective settings: stored values with constants layered on top.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let mut settings = self.store.load()?;
        if !self.constants.endpoint.is_empty() {
            settings.endpoint = self.constants.endpoint.clone();
        }
        if !self.constants.api_key.is_empty() {
            settings.api_key = self.constants.api_key.clone();
        }
        if !self.constants.mailbox_id.is_empty() {
            settings.mailbox_id = self.constants.mailbox_id.clone();
        }
        settings.max_recording_seconds = MAX_RECORDING_SECONDS;
        Ok(settings)
    }

    /// Whether the effective settings carry all three helpdesk credentials.
    pub fn is_configured(&self) -> Result<bool, ConfigError> {
        Ok(self.settings()?.is_configured())
    }

    /// Look up one effective setting by key, rendered as a string.
    pub fn get_value(&self, key: &str) -> Result<String, ConfigError> {
        let settings = self.settings()?;
        let value = match key {
            "endpoint" => settings.endpoint,
            "api_key" => settings.api_key,
            "mailbox_id" => settings.mailbox_id,
            "default_assignee" => settings.default_assignee,
            "record_audio" => settings.record_audio.to_string(),
            "record_system_audio" => settings.record_system_audio.to_string(),
            "max_recording_seconds" => settings.max_recording_seconds.to_string(),
            "video_quality" => format!("{:?}", settings.video_quality).to_lowercase(),
            "include_har" => settings.include_har.to_string(),
            "max_file_size" => settings.max_file_size.to_string(),
            other => return Err(ConfigError::UnknownKey(other.to_owned())),
        };
        Ok(value)
    }

    /// Update one stored setting by key.
    ///
    /// Constant-pinned keys and the fixed recording length are rejected.
    pub fn set_value(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        if self.constants.pins(key) {
            return Err(ConfigError::ConstantBacked(key.to_owned()));
        }

        let mut settings = self.store.load()?;
        match key {
            "endpoint" => settings.endpoint = value.to_owned(),
            "api_key" => settings.api_key = value.to_owned(),
            "mailbox_id" => settings.mailbox_id = value.to_owned(),
            "default_assignee" => settings.default_assignee = value.to_owned(),
            "record_audio" => settings.record_audio = parse_bool(key, value)?,
            "record_system_audio" => settings.record_system_audio = parse_bool(key, value)?,
            "max_recording_seconds" => {
                return Err(ConfigError::Validation(format!(
                    "max_recording_seconds is fixed at {MAX_RECORDING_SECONDS}"
                )));
            }
            "video_quality" => {
                settings.video_quality = value
                    .parse::<VideoQuality>()
                    .map_err(ConfigError::Validation)?;
            }
            "include_har" => settings.include_har = parse_bool(key, value)?,
            "max_file_size" => {
                settings.max_file_size = value.parse().map_err(|_| {
                    ConfigError::Validation(format!(
                        "max_file_size must be a byte count, got '{value}'"
                    ))
                })?;
            }
            other => return Err(ConfigError::UnknownKey(other.to_owned())),
        }

        self.save(settings)
    }

    /// Validate and persist settings.
    ///
    /// Fields pinned by the constants are cleared before writing, and the
    /// recording length is reset to its fixed value, so local state never
    /// shadows the deployment configuration.
    pub fn save(&self, mut settings: Settings) -> Result<(), ConfigError> {
        settings.validate()?;
        if self.constants.pins("endpoint") {
            settings.endpoint = String::new();
        }
        if self.constants.pins("api_key") {
            settings.api_key = String::new();
        }
        if self.constants.pins("mailbox_id") {
            settings.mailbox_id = String::new();
        }
        settings.max_recording_seconds = MAX_RECORDING_SECONDS;
        self.store.save(&settings)?;
        debug!("settings persisted");
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Validation(format!("{key} must be true or false, got '{value}'")))
}
