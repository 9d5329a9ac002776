/// Configuration for the helpdesk client.
#[derive(Clone)]
pub struct HelpdeskConfig {
    /// Base URL of the helpdesk instance (no trailing slash).
    pub endpoint: String,

    /// API key sent with every request.
    pub api_key: String,

    /// Mailbox that receives created conversations.
    pub mailbox_id: String,

    /// Customer email used as the reporter identity. Falls back to a
    /// built-in address when unset.
    pub default_assignee: Option<String>,

    /// Maximum accepted size in bytes for any submitted blob.
    pub max_file_size: u64,
}

/// Default submission size ceiling (50 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

impl std::fmt::Debug for HelpdeskConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HelpdeskConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .field("mailbox_id", &self.mailbox_id)
            .field("default_assignee", &self.default_assignee)
            .field("max_file_size", &self.max_file_size)
            .finish()
    }
}

impl HelpdeskConfig {
    /// Create a configuration for the given helpdesk instance.
    ///
    /// A trailing slash on the endpoint is stripped so URL joining stays
    /// uniform.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        mailbox_id: impl Into<String>,
    ) -> Self {
        let endpoint = endpoint.into();
        Self {
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
            mailbox_id: mailbox_id.into(),
            default_assignee: None,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Set the customer email used as the reporter identity.
    #[must_use]
    pub fn with_default_assignee(mut self, email: impl Into<String>) -> Self {
        let email = email.into();
        self.default_assignee = if email.is_empty() { None } else { Some(email) };
        self
    }

    /// Override the submission size ceiling.
    #[must_use]
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Whether all fields needed for a network call are present.
    pub fn is_configured(&self) -> bool {
        !self.endpoint.is_empty() && !self.api_key.is_empty() && !self.mailbox_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_stripped() {
        let config = HelpdeskConfig::new("https://desk.example.com/", "key", "3");
        assert_eq!(config.endpoint, "https://desk.example.com");
    }

    #[test]
    fn defaults() {
        let config = HelpdeskConfig::new("https://desk.example.com", "key", "3");
        assert!(config.default_assignee.is_none());
        assert_eq!(config.max_file_size, 50 * 1024 * 1024);
        assert!(config.is_configured());
    }

    #[test]
    fn empty_assignee_stays_unset() {
        let config = HelpdeskConfig::new("https://d.example", "k", "1").with_default_assignee("");
        assert!(config.default_assignee.is_none());
    }

    #[test]
    fn builder_chain() {
        let config = HelpdeskConfig::new("https://d.example", "k", "1")
            .with_default_assignee("bugs@example.com")
            .with_max_file_size(1024);
        assert_eq!(config.default_assignee.as_deref(), Some("bugs@example.com"));
        assert_eq!(config.max_file_size, 1024);
    }

    #[test]
    fn unconfigured_when_any_credential_missing() {
        assert!(!HelpdeskConfig::new("", "k", "1").is_configured());
        assert!(!HelpdeskConfig::new("https://d.example", "", "1").is_configured());
        assert!(!HelpdeskConfig::new("https://d.example", "k", "").is_configured());
    }

    #[test]
    fn debug_redacts_api_key() {
        let key = "test-api-key-placeholder";
        let config = HelpdeskConfig::new("https://d.example", key, "1");
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains(key));
    }
}
