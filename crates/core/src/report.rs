use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a reported bug.
///
/// Serialized as a lowercase name; the helpdesk wire format uses the digit
/// form (`"1"` is highest) via [`Priority::wire_digit`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// The digit form used in ticket payloads (`"1"` through `"3"`).
    pub fn wire_digit(self) -> &'static str {
        match self {
            Self::High => "1",
            Self::Medium => "2",
            Self::Low => "3",
        }
    }

    /// Human-readable label shown in the rendered ticket body.
    pub fn label(self) -> &'static str {
        match self {
            Self::High => "\u{1f534} High",
            Self::Medium => "\u{1f7e1} Medium",
            Self::Low => "\u{1f7e2} Low",
        }
    }

    /// Parse the digit form. Unknown digits map to `None`.
    pub fn from_digit(digit: &str) -> Option<Self> {
        match digit {
            "1" => Some(Self::High),
            "2" => Some(Self::Medium),
            "3" => Some(Self::Low),
            _ => None,
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "1" | "high" => Ok(Self::High),
            "2" | "medium" => Ok(Self::Medium),
            "3" | "low" => Ok(Self::Low),
            other => Err(format!(
                "invalid priority '{other}': expected 1-3 or high/medium/low"
            )),
        }
    }
}

/// A bug report as captured from the reporter.
///
/// Immutable once constructed; consumed by ticket creation, which renders it
/// into the conversation subject, body, and tag list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BugReport {
    /// Short summary, used as the ticket subject.
    pub title: String,

    /// Free-form description. Newlines are preserved as line breaks in the
    /// rendered body.
    pub description: String,

    /// Severity of the report.
    #[serde(default)]
    pub priority: Priority,

    /// Free-form report category (e.g. `"bug"`, `"feature"`), also applied
    /// as a ticket tag.
    pub report_type: String,

    /// URL of the page the report was captured on.
    pub page_url: String,

    /// Title of the page the report was captured on.
    pub page_title: String,

    /// User-agent string of the reporting browser.
    pub user_agent: String,

    /// When the report was captured.
    pub timestamp: DateTime<Utc>,
}

impl BugReport {
    /// Create a new report with the given title and description. The
    /// timestamp is set to now; everything else defaults to empty.
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            priority: Priority::default(),
            report_type: "bug".to_owned(),
            page_url: String::new(),
            page_title: String::new(),
            user_agent: String::new(),
            timestamp: Utc::now(),
        }
    }

    /// Set the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the report category.
    #[must_use]
    pub fn with_report_type(mut self, report_type: impl Into<String>) -> Self {
        self.report_type = report_type.into();
        self
    }

    /// Set the page URL.
    #[must_use]
    pub fn with_page_url(mut self, page_url: impl Into<String>) -> Self {
        self.page_url = page_url.into();
        self
    }

    /// Set the page title.
    #[must_use]
    pub fn with_page_title(mut self, page_title: impl Into<String>) -> Self {
        self.page_title = page_title.into();
        self
    }

    /// Set the reporting browser's user-agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Override the capture timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Ticket tags for this report: `bug-reporter`, the report category, and
    /// `high-priority` for high-priority reports.
    pub fn tags(&self) -> Vec<String> {
        let mut tags = vec!["bug-reporter".to_owned(), self.report_type.clone()];
        if self.priority == Priority::High {
            tags.push("high-priority".to_owned());
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_wire_digits() {
        assert_eq!(Priority::High.wire_digit(), "1");
        assert_eq!(Priority::Medium.wire_digit(), "2");
        assert_eq!(Priority::Low.wire_digit(), "3");
    }

    #[test]
    fn priority_labels() {
        assert_eq!(Priority::High.label(), "\u{1f534} High");
        assert_eq!(Priority::Medium.label(), "\u{1f7e1} Medium");
        assert_eq!(Priority::Low.label(), "\u{1f7e2} Low");
    }

    #[test]
    fn priority_from_digit() {
        assert_eq!(Priority::from_digit("1"), Some(Priority::High));
        assert_eq!(Priority::from_digit("3"), Some(Priority::Low));
        assert_eq!(Priority::from_digit("4"), None);
    }

    #[test]
    fn priority_from_str_accepts_names_and_digits() {
        assert_eq!("high".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("Medium".parse::<Priority>().unwrap(), Priority::Medium);
        assert_eq!("2".parse::<Priority>().unwrap(), Priority::Medium);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn default_priority_is_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn tags_include_category() {
        let report = BugReport::new("t", "d").with_report_type("feature");
        assert_eq!(report.tags(), vec!["bug-reporter", "feature"]);
    }

    #[test]
    fn tags_include_high_priority_marker() {
        let report = BugReport::new("t", "d").with_priority(Priority::High);
        assert_eq!(report.tags(), vec!["bug-reporter", "bug", "high-priority"]);
    }

    #[test]
    fn builder_chain() {
        let report = BugReport::new("Crash on save", "It crashes")
            .with_priority(Priority::Low)
            .with_report_type("bug")
            .with_page_url("https://example.com/app")
            .with_page_title("App")
            .with_user_agent("Mozilla/5.0");
        assert_eq!(report.title, "Crash on save");
        assert_eq!(report.priority, Priority::Low);
        assert_eq!(report.page_url, "https://example.com/app");
        assert_eq!(report.user_agent, "Mozilla/5.0");
    }

    #[test]
    fn report_serde_roundtrip() {
        let report = BugReport::new("t", "d").with_priority(Priority::High);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"priority\":\"high\""));
        let back: BugReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.priority, Priority::High);
    }
}
