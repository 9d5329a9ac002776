//! HTML rendering for conversation bodies and attachment threads.
//!
//! Renders with `MiniJinja` (Jinja2-compatible). Templates are registered
//! under `.html` names so the default auto-escape policy applies to every
//! interpolated value; user-supplied text never reaches the markup unescaped.

use bugrelay_core::useragent;
use bugrelay_core::{BugReport, MediaBlob};
use minijinja::{Environment, State, Value, context};

use crate::error::HelpdeskError;

/// Body of the initial conversation thread.
///
/// The receiving system parses this structure, so the markup is fixed:
/// heading, description, details list, technical list, media note.
const CONVERSATION_BODY: &str = r#"<h2>Bug Report</h2>

<p><strong>Description:</strong></p>
<p>{{ description|nl2br }}</p>

<hr>

<h3>Additional Details</h3>
<ul>
  <li><strong>Type:</strong> {{ report_type }}</li>
  <li><strong>Priority:</strong> {{ priority }}</li>
  <li><strong>Page URL:</strong> <a href="{{ page_url }}">{{ page_url }}</a></li>
  <li><strong>Page Title:</strong> {{ page_title }}</li>
  <li><strong>Reported:</strong> {{ reported_at }}</li>
</ul>

<hr>

<h3>Technical Information</h3>
<ul>
  <li><strong>User Agent:</strong> {{ user_agent }}</li>
  <li><strong>Browser:</strong> {{ browser }}</li>
  <li><strong>OS:</strong> {{ os }}</li>
</ul>

<p><em>Captured media (screenshot or video) attached below.</em></p>
"#;

/// Thread text embedding an image directly as a `data:` URI.
const INLINE_IMAGE_THREAD: &str = r#"<p><strong>{{ description }}</strong></p>
<p><img src="{{ src }}" alt="{{ file_name }}" style="max-width: 100%;"></p>
"#;

/// Thread text carrying the file as a `data:` download link.
const INLINE_LINK_THREAD: &str = r#"<p><strong>Attachment:</strong> {{ description }}</p>
<p><a href="{{ href }}" download="{{ file_name }}">Download {{ file_name }}</a> ({{ size }})</p>
"#;

/// Thread text accompanying a file delivered outside the thread body.
const ATTACHMENT_NOTE: &str = r#"<p><strong>Attachment:</strong> {{ description }}</p>
<p>{{ file_name }} ({{ size }})</p>
"#;

/// `nl2br` filter: escape the value, then turn newlines into `<br>` tags.
///
/// Escaping happens before the replacement so the inserted tags survive
/// auto-escape while everything user-supplied is still neutralized.
fn nl2br(state: &State<'_, '_>, value: Value) -> Result<Value, minijinja::Error> {
    let escaped = minijinja::filters::escape(state, &value)?;
    let text = escaped.as_str().unwrap_or_default().replace('\n', "<br>");
    Ok(Value::from_safe_string(text))
}

fn environment() -> Result<Environment<'static>, HelpdeskError> {
    let mut env = Environment::new();
    env.add_filter("nl2br", nl2br);
    env.add_template("conversation.html", CONVERSATION_BODY)?;
    env.add_template("inline_image.html", INLINE_IMAGE_THREAD)?;
    env.add_template("inline_link.html", INLINE_LINK_THREAD)?;
    env.add_template("note.html", ATTACHMENT_NOTE)?;
    Ok(env)
}

/// Render the initial conversation body for a report.
///
/// Browser and OS labels are derived from the user-agent string; the capture
/// timestamp is shown in the local timezone.
pub fn conversation_body(report: &BugReport) -> Result<String, HelpdeskError> {
    let env = environment()?;
    let reported_at = report
        .timestamp
        .with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();
    let rendered = env.get_template("conversation.html")?.render(context! {
        description => &report.description,
        report_type => &report.report_type,
        priority => report.priority.label(),
        page_url => &report.page_url,
        page_title => &report.page_title,
        reported_at => reported_at,
        user_agent => &report.user_agent,
        browser => useragent::browser_label(&report.user_agent),
        os => useragent::os_label(&report.user_agent),
    })?;
    Ok(rendered)
}

/// Render a thread body embedding the image inline as a `data:` URI.
pub fn inline_image_thread(description: &str, blob: &MediaBlob) -> Result<String, HelpdeskError> {
    let env = environment()?;
    let rendered = env.get_template("inline_image.html")?.render(context! {
        description => description,
        // The data URL is machine-built from the MIME type and base64
        // payload; escaping it would corrupt the URI.
        src => Value::from_safe_string(blob.to_data_url()),
        file_name => blob.upload_file_name(),
    })?;
    Ok(rendered)
}

/// Render a thread body carrying the file as a `data:` download link.
pub fn inline_link_thread(description: &str, blob: &MediaBlob) -> Result<String, HelpdeskError> {
    let env = environment()?;
    let rendered = env.get_template("inline_link.html")?.render(context! {
        description => description,
        href => Value::from_safe_string(blob.to_data_url()),
        file_name => blob.upload_file_name(),
        size => blob.size_label(),
    })?;
    Ok(rendered)
}

/// Render the short note that rides along with a file delivered as a JSON
/// or multipart attachment.
pub fn attachment_note(description: &str, blob: &MediaBlob) -> Result<String, HelpdeskError> {
    let env = environment()?;
    let rendered = env.get_template("note.html")?.render(context! {
        description => description,
        file_name => blob.upload_file_name(),
        size => blob.size_label(),
    })?;
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use bugrelay_core::Priority;

    use super::*;

    const CHROME_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

    fn sample_report() -> BugReport {
        BugReport::new("Crash on save", "Clicked save\nEverything froze")
            .with_priority(Priority::High)
            .with_page_url("https://example.com/checkout")
            .with_page_title("Checkout")
            .with_user_agent(CHROME_UA)
    }

    #[test]
    fn body_contains_all_sections() {
        let body = conversation_body(&sample_report()).unwrap();
        assert!(body.contains("<h2>Bug Report</h2>"));
        assert!(body.contains("<h3>Additional Details</h3>"));
        assert!(body.contains("<h3>Technical Information</h3>"));
        assert!(body.contains("Captured media (screenshot or video) attached below"));
    }

    #[test]
    fn body_derives_browser_and_os() {
        let body = conversation_body(&sample_report()).unwrap();
        assert!(body.contains("Chrome 120"));
        assert!(body.contains("Windows"));
    }

    #[test]
    fn body_shows_priority_label() {
        let body = conversation_body(&sample_report()).unwrap();
        assert!(body.contains("\u{1f534} High"));
    }

    #[test]
    fn description_newlines_become_breaks() {
        let body = conversation_body(&sample_report()).unwrap();
        assert!(body.contains("Clicked save<br>Everything froze"));
    }

    #[test]
    fn description_markup_is_escaped() {
        let report = BugReport::new("t", "<script>alert('x')</script>");
        let body = conversation_body(&report).unwrap();
        assert!(!body.contains("<script>"));
        assert!(body.contains("&lt;script&gt;"));
    }

    #[test]
    fn title_never_appears_unescaped_in_details() {
        let report = sample_report().with_page_title("<b>Checkout</b>");
        let body = conversation_body(&report).unwrap();
        assert!(!body.contains("<b>Checkout</b>"));
        assert!(body.contains("&lt;b&gt;"));
    }

    #[test]
    fn image_thread_embeds_data_url() {
        let blob = MediaBlob::new(b"png-bytes".to_vec(), "image/png");
        let text = inline_image_thread("Crash on save", &blob).unwrap();
        assert!(text.contains("<img src=\"data:image/png;base64,"));
        assert!(text.contains("Crash on save"));
    }

    #[test]
    fn image_thread_escapes_description() {
        let blob = MediaBlob::new(b"png-bytes".to_vec(), "image/png");
        let text = inline_image_thread("<script>x</script>", &blob).unwrap();
        assert!(!text.contains("<script>"));
    }

    #[test]
    fn link_thread_carries_download_link_and_size() {
        let blob = MediaBlob::new(vec![0u8; 2048], "application/json").with_file_name("log.har");
        let text = inline_link_thread("Network log", &blob).unwrap();
        assert!(text.contains("<a href=\"data:application/json;base64,"));
        assert!(text.contains("download=\"log.har\""));
        assert!(text.contains("(2 KB)"));
    }

    #[test]
    fn note_names_the_file() {
        let blob = MediaBlob::new(vec![1, 2, 3], "video/webm").with_file_name("clip.webm");
        let text = attachment_note("Recording", &blob).unwrap();
        assert!(text.contains("clip.webm"));
        assert!(text.contains("Recording"));
    }
}
