use std::path::Path;

use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

/// Fixed deployment constants shipped alongside the tool as a read-only JSON
/// file (`freescout.config.json`).
///
/// Any value present here overrides the locally stored setting for the same
/// field. A missing or unreadable file yields empty constants rather than an
/// error, so the tool still runs from stored settings alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeploymentConstants {
    /// Helpdesk base URL.
    #[serde(default, rename = "freescoutUrl")]
    pub endpoint: String,

    /// Helpdesk API key.
    #[serde(default, rename = "apiKey")]
    pub api_key: String,

    /// Target mailbox id. Accepts a JSON number for compatibility with
    /// hand-written config files; coerced to its string form.
    #[serde(
        default,
        rename = "mailboxId",
        deserialize_with = "string_or_number"
    )]
    pub mailbox_id: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(i64),
    }

    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => Ok(s),
        StringOrNumber::Number(n) => Ok(n.to_string()),
    }
}

impl DeploymentConstants {
    /// Load constants from the given path.
    ///
    /// A missing file is normal (no deployment pinning); a malformed file is
    /// logged and treated as empty.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no deployment constants file");
                return Self::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(constants) => constants,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring malformed deployment constants file");
                Self::default()
            }
        }
    }

    /// Parse constants from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Whether all three credential fields are pinned.
    pub fn is_complete(&self) -> bool {
        !self.endpoint.is_empty() && !self.api_key.is_empty() && !self.mailbox_id.is_empty()
    }

    /// Whether the named settings key is pinned by these constants.
    pub fn pins(&self, key: &str) -> bool {
        match key {
            "endpoint" => !self.endpoint.is_empty(),
            "api_key" => !self.api_key.is_empty(),
            "mailbox_id" => !self.mailbox_id.is_empty(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_packaged_shape() {
        let constants = DeploymentConstants::from_json(
            r#"{"freescoutUrl":"https://desk.example.com","apiKey":"k123","mailboxId":"7"}"#,
        )
        .unwrap();
        assert_eq!(constants.endpoint, "https://desk.example.com");
        assert_eq!(constants.api_key, "k123");
        assert_eq!(constants.mailbox_id, "7");
        assert!(constants.is_complete());
    }

    #[test]
    fn numeric_mailbox_id_coerces_to_string() {
        let constants = DeploymentConstants::from_json(
            r#"{"freescoutUrl":"https://desk.example.com","apiKey":"k","mailboxId":7}"#,
        )
        .unwrap();
        assert_eq!(constants.mailbox_id, "7");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let constants = DeploymentConstants::from_json("{}").unwrap();
        assert!(constants.endpoint.is_empty());
        assert!(!constants.is_complete());
    }

    #[test]
    fn missing_file_yields_empty_constants() {
        let constants = DeploymentConstants::load("/nonexistent/freescout.config.json");
        assert!(!constants.is_complete());
    }

    #[test]
    fn pins_tracks_nonempty_fields() {
        let constants =
            DeploymentConstants::from_json(r#"{"freescoutUrl":"https://d.example"}"#).unwrap();
        assert!(constants.pins("endpoint"));
        assert!(!constants.pins("api_key"));
        assert!(!constants.pins("default_assignee"));
    }
}
