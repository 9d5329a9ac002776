use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Recording length is fixed; stored values are ignored and never persisted.
pub const MAX_RECORDING_SECONDS: u32 = 30;

/// Default submission size ceiling (50 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));

/// Video capture quality preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoQuality {
    Low,
    #[default]
    Medium,
    High,
}

impl std::str::FromStr for VideoQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!(
                "invalid video quality '{other}': expected low, medium, or high"
            )),
        }
    }
}

impl VideoQuality {
    /// Capture constraints for this preset.
    pub fn constraints(self) -> CaptureConstraints {
        match self {
            Self::Low => CaptureConstraints {
                width: 1280,
                height: 720,
                frame_rate: 15,
            },
            Self::Medium => CaptureConstraints {
                width: 1920,
                height: 1080,
                frame_rate: 24,
            },
            Self::High => CaptureConstraints {
                width: 2560,
                height: 1440,
                frame_rate: 30,
            },
        }
    }
}

/// Ideal video dimensions and frame rate for a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConstraints {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
}

/// Audio processing constraints applied when microphone capture is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioConstraints {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub sample_rate: u32,
}

/// User-facing settings for the reporter.
///
/// The three credential fields (`endpoint`, `api_key`, `mailbox_id`) are
/// normally supplied by the packaged deployment constants, which take
/// precedence over anything stored here; see
/// [`SettingsProvider`](crate::provider::SettingsProvider).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Helpdesk base URL.
    #[serde(default)]
    pub endpoint: String,

    /// Helpdesk API key.
    #[serde(default)]
    pub api_key: String,

    /// Target mailbox id.
    #[serde(default)]
    pub mailbox_id: String,

    /// Customer email used for created tickets. Empty means the built-in
    /// fallback address is used.
    #[serde(default)]
    pub default_assignee: String,

    /// Whether to capture microphone audio during recordings.
    #[serde(default = "default_record_audio")]
    pub record_audio: bool,

    /// Whether to capture system audio during recordings.
    #[serde(default)]
    pub record_system_audio: bool,

    /// Maximum recording length in seconds. Pinned to
    /// [`MAX_RECORDING_SECONDS`] when loaded through the provider.
    #[serde(default = "default_max_recording_seconds")]
    pub max_recording_seconds: u32,

    /// Video capture quality preset.
    #[serde(default)]
    pub video_quality: VideoQuality,

    /// Whether to attach a network-activity (HAR) log to submissions.
    #[serde(default)]
    pub include_har: bool,

    /// Maximum accepted file size in bytes for any submitted blob.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

fn default_record_audio() -> bool {
    true
}

fn default_max_recording_seconds() -> u32 {
    MAX_RECORDING_SECONDS
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            mailbox_id: String::new(),
            default_assignee: String::new(),
            record_audio: default_record_audio(),
            record_system_audio: false,
            max_recording_seconds: default_max_recording_seconds(),
            video_quality: VideoQuality::default(),
            include_har: false,
            max_file_size: default_max_file_size(),
        }
    }
}

impl Settings {
    /// Whether the credential fields needed for any helpdesk call are all
    /// present.
    pub fn is_configured(&self) -> bool {
        !self.endpoint.is_empty() && !self.api_key.is_empty() && !self.mailbox_id.is_empty()
    }

    /// Validate field contents.
    ///
    /// Only the assignee email needs checking; everything else is constrained
    /// by its type.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let assignee = self.default_assignee.trim();
        if !assignee.is_empty() && !EMAIL_RE.is_match(assignee) {
            return Err(ConfigError::Validation(format!(
                "'{assignee}' is not a valid email address for default_assignee"
            )));
        }
        Ok(())
    }

    /// Audio constraints for a capture session, or `None` when microphone
    /// capture is disabled.
    pub fn audio_constraints(&self) -> Option<AudioConstraints> {
        if !self.record_audio {
            return None;
        }
        Some(AudioConstraints {
            echo_cancellation: true,
            noise_suppression: true,
            sample_rate: 44_100,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert!(settings.endpoint.is_empty());
        assert!(settings.record_audio);
        assert!(!settings.record_system_audio);
        assert_eq!(settings.max_recording_seconds, 30);
        assert_eq!(settings.video_quality, VideoQuality::Medium);
        assert!(!settings.include_har);
        assert_eq!(settings.max_file_size, 50 * 1024 * 1024);
        assert!(!settings.is_configured());
    }

    #[test]
    fn configured_requires_all_three_credentials() {
        let mut settings = Settings {
            endpoint: "https://desk.example.com".into(),
            api_key: "key".into(),
            ..Settings::default()
        };
        assert!(!settings.is_configured());
        settings.mailbox_id = "3".into();
        assert!(settings.is_configured());
    }

    #[test]
    fn validate_accepts_empty_assignee() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_malformed_email() {
        let settings = Settings {
            default_assignee: "not-an-email".into(),
            ..Settings::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("not-an-email"));
    }

    #[test]
    fn validate_accepts_plausible_email() {
        let settings = Settings {
            default_assignee: "bugs@example.com".into(),
            ..Settings::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn quality_presets() {
        assert_eq!(
            VideoQuality::Low.constraints(),
            CaptureConstraints {
                width: 1280,
                height: 720,
                frame_rate: 15
            }
        );
        assert_eq!(VideoQuality::Medium.constraints().frame_rate, 24);
        assert_eq!(VideoQuality::High.constraints().width, 2560);
    }

    #[test]
    fn audio_constraints_follow_record_flag() {
        let on = Settings::default();
        let constraints = on.audio_constraints().unwrap();
        assert!(constraints.echo_cancellation);
        assert_eq!(constraints.sample_rate, 44_100);

        let off = Settings {
            record_audio: false,
            ..Settings::default()
        };
        assert!(off.audio_constraints().is_none());
    }

    #[test]
    fn settings_toml_roundtrip() {
        let settings = Settings {
            default_assignee: "bugs@example.com".into(),
            video_quality: VideoQuality::High,
            include_har: true,
            ..Settings::default()
        };
        let text = toml::to_string(&settings).unwrap();
        let back: Settings = toml::from_str(&text).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let back: Settings = toml::from_str("default_assignee = \"a@b.c\"\n").unwrap();
        assert!(back.record_audio);
        assert_eq!(back.max_file_size, DEFAULT_MAX_FILE_SIZE);
        assert_eq!(back.video_quality, VideoQuality::Medium);
    }
}
