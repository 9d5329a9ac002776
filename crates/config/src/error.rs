use thiserror::Error;

/// Errors from loading, validating, or persisting settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read or written.
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid TOML.
    #[error("settings parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The settings could not be serialized for persistence.
    #[error("settings serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A settings value failed validation.
    #[error("invalid setting: {0}")]
    Validation(String),

    /// The key is sourced from the deployment constants file and cannot be
    /// stored locally.
    #[error("'{0}' is fixed by the deployment constants file and cannot be changed here")]
    ConstantBacked(String),

    /// The key is not a known setting.
    #[error("unknown setting '{0}'")]
    UnknownKey(String),
}
