use bugrelay_config::SettingsProvider;
use clap::{Args, Subcommand};

use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective settings.
    Show,
    /// Read one setting by key.
    Get {
        /// Setting name.
        key: String,
    },
    /// Change one stored setting.
    Set {
        /// Setting name.
        key: String,
        /// New value.
        value: String,
    },
}

pub fn run(
    provider: &SettingsProvider,
    args: &ConfigArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    match &args.command {
        ConfigCommand::Show => show(provider, format),
        ConfigCommand::Get { key } => {
            println!("{}", provider.get_value(key)?);
            Ok(())
        }
        ConfigCommand::Set { key, value } => {
            provider.set_value(key, value)?;
            println!("Setting '{key}' updated.");
            Ok(())
        }
    }
}

fn show(provider: &SettingsProvider, format: &OutputFormat) -> anyhow::Result<()> {
    let settings = provider.settings()?;
    match format {
        OutputFormat::Json => {
            // The API key never leaves the process in readable form.
            let mut value = serde_json::to_value(&settings)?;
            if let Some(key) = value.get_mut("api_key")
                && !settings.api_key.is_empty()
            {
                *key = serde_json::Value::String("[REDACTED]".to_owned());
            }
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            let api_key = if settings.api_key.is_empty() {
                "(unset)"
            } else {
                "[REDACTED]"
            };
            println!("endpoint: {}", or_unset(&settings.endpoint));
            println!("api_key: {api_key}");
            println!("mailbox_id: {}", or_unset(&settings.mailbox_id));
            println!("default_assignee: {}", or_unset(&settings.default_assignee));
            println!("record_audio: {}", settings.record_audio);
            println!("record_system_audio: {}", settings.record_system_audio);
            println!("max_recording_seconds: {}", settings.max_recording_seconds);
            println!(
                "video_quality: {}",
                format!("{:?}", settings.video_quality).to_lowercase()
            );
            println!("include_har: {}", settings.include_har);
            println!("max_file_size: {}", settings.max_file_size);
        }
    }
    Ok(())
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() { "(unset)" } else { value }
}
