use std::path::{Path, PathBuf};

use anyhow::Context;
use bugrelay_client::HelpdeskClient;
use bugrelay_core::{BugReport, MediaBlob, Priority};
use clap::Args;
use tracing::debug;

use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Report title, used as the conversation subject.
    #[arg(long)]
    pub title: String,
    /// What went wrong.
    #[arg(long)]
    pub description: String,
    /// Priority (1-3 or high/medium/low).
    #[arg(long, default_value = "medium")]
    pub priority: Priority,
    /// Report category, applied as a conversation tag.
    #[arg(long, name = "type", default_value = "bug")]
    pub report_type: String,
    /// URL of the page the bug was observed on.
    #[arg(long)]
    pub page_url: Option<String>,
    /// Title of the page the bug was observed on.
    #[arg(long)]
    pub page_title: Option<String>,
    /// User agent recorded in the report body.
    #[arg(long)]
    pub user_agent: Option<String>,
    /// Captured screenshot or recording, attached first.
    #[arg(long)]
    pub capture: Option<PathBuf>,
    /// Additional file to attach (repeatable).
    #[arg(long)]
    pub attach: Vec<PathBuf>,
    /// Network activity log to attach; always sent as JSON.
    #[arg(long)]
    pub har: Option<PathBuf>,
}

pub async fn run(
    client: &HelpdeskClient,
    args: &SubmitArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let mut report = BugReport::new(&args.title, &args.description)
        .with_priority(args.priority)
        .with_report_type(&args.report_type)
        .with_user_agent(
            args.user_agent
                .clone()
                .unwrap_or_else(default_user_agent),
        );
    if let Some(url) = &args.page_url {
        report = report.with_page_url(url);
    }
    if let Some(title) = &args.page_title {
        report = report.with_page_title(title);
    }

    let capture = args.capture.as_deref().map(read_blob).transpose()?;

    let mut additional = Vec::new();
    for path in &args.attach {
        additional.push(read_blob(path)?);
    }
    if let Some(path) = &args.har {
        additional.push(read_har_blob(path)?);
    }

    let outcome = client.submit(&report, capture.as_ref(), &additional).await;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        OutputFormat::Text => {
            if let Some(id) = outcome.conversation_id {
                println!("Created conversation {id}.");
            }
            for failure in &outcome.attachment_failures {
                println!("  failed to attach {}: {}", failure.file_name, failure.error);
            }
            if let Some(error) = &outcome.error {
                eprintln!("Submission failed: {error}");
            }
        }
    }

    if !outcome.is_complete() {
        std::process::exit(1);
    }
    Ok(())
}

/// Synthetic user agent recorded when none is supplied.
fn default_user_agent() -> String {
    format!(
        "bugrelay/{} ({})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    )
}

fn read_blob(path: &Path) -> anyhow::Result<MediaBlob> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let content_type = mime_guess::from_path(path).first_or_octet_stream().to_string();
    let mut blob = MediaBlob::new(bytes, content_type);
    if let Some(name) = path.file_name() {
        blob = blob.with_file_name(name.to_string_lossy());
    }
    Ok(blob)
}

/// Read a network activity log. HAR files are JSON whatever their extension
/// says, so the sniffed content type is overridden.
fn read_har_blob(path: &Path) -> anyhow::Result<MediaBlob> {
    let mut blob = read_blob(path)?;
    debug!(
        path = %path.display(),
        sniffed = %blob.content_type,
        "sending network log as application/json"
    );
    blob.content_type = "application/json".to_owned();
    Ok(blob)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn har_blob_is_sent_as_json() {
        let dir = std::env::temp_dir().join(format!("bugrelay-har-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("session.har");
        std::fs::write(&path, br#"{"log":{"entries":[]}}"#).unwrap();

        let blob = read_har_blob(&path).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(blob.content_type, "application/json");
        assert_eq!(blob.file_name.as_deref(), Some("session.har"));
    }
}
