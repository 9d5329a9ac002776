//! Browser and OS extraction from user-agent strings.
//!
//! Substring matching only, mirroring what the rendered ticket body expects:
//! Chrome and Firefox get a major version, Safari and Edge are name-only, and
//! anything else is `"Unknown"`. Match order matters because Chrome user
//! agents also contain `Safari`.

use std::sync::LazyLock;

use regex::Regex;

static CHROME_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Chrome/(\d+)").expect("Chrome version regex is valid"));

static FIREFOX_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Firefox/(\d+)").expect("Firefox version regex is valid"));

/// Browser name with major version where one can be extracted, e.g.
/// `"Chrome 120"` or `"Safari"`.
pub fn browser_label(user_agent: &str) -> String {
    if user_agent.contains("Chrome") {
        match CHROME_VERSION_RE
            .captures(user_agent)
            .and_then(|c| c.get(1))
        {
            Some(version) => format!("Chrome {}", version.as_str()),
            None => "Chrome".to_owned(),
        }
    } else if user_agent.contains("Firefox") {
        match FIREFOX_VERSION_RE
            .captures(user_agent)
            .and_then(|c| c.get(1))
        {
            Some(version) => format!("Firefox {}", version.as_str()),
            None => "Firefox".to_owned(),
        }
    } else if user_agent.contains("Safari") {
        "Safari".to_owned()
    } else if user_agent.contains("Edge") {
        "Edge".to_owned()
    } else {
        "Unknown".to_owned()
    }
}

/// Operating system name from a user-agent string.
pub fn os_label(user_agent: &str) -> &'static str {
    if user_agent.contains("Windows") {
        "Windows"
    } else if user_agent.contains("Mac OS") {
        "macOS"
    } else if user_agent.contains("Linux") {
        "Linux"
    } else if user_agent.contains("Android") {
        "Android"
    } else if user_agent.contains("iOS") {
        "iOS"
    } else {
        "Unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                             (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const FIREFOX_UA: &str =
        "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
    const SAFARI_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                             AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15";

    #[test]
    fn chrome_with_version() {
        assert_eq!(browser_label(CHROME_UA), "Chrome 120");
    }

    #[test]
    fn firefox_with_version() {
        assert_eq!(browser_label(FIREFOX_UA), "Firefox 121");
    }

    #[test]
    fn safari_name_only() {
        assert_eq!(browser_label(SAFARI_UA), "Safari");
    }

    #[test]
    fn chrome_wins_over_safari_token() {
        // Chrome UAs carry a Safari token; the Chrome branch must match first.
        assert!(CHROME_UA.contains("Safari"));
        assert_eq!(browser_label(CHROME_UA), "Chrome 120");
    }

    #[test]
    fn unknown_browser() {
        assert_eq!(browser_label("curl/8.4.0"), "Unknown");
    }

    #[test]
    fn os_names() {
        assert_eq!(os_label(CHROME_UA), "Windows");
        assert_eq!(os_label(SAFARI_UA), "macOS");
        assert_eq!(os_label(FIREFOX_UA), "Linux");
        assert_eq!(os_label("something iOS something"), "iOS");
        assert_eq!(os_label("curl/8.4.0"), "Unknown");
    }
}
