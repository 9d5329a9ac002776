//! bugrelay CLI
//!
//! A command-line interface for filing bug reports, with their captured
//! media, against a FreeScout helpdesk.

mod commands;

use bugrelay_client::{HelpdeskClient, HelpdeskConfig};
use bugrelay_config::{DeploymentConstants, FileStore, SettingsProvider};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

/// File bug reports against a FreeScout helpdesk.
#[derive(Parser, Debug)]
#[command(name = "bugrelay", version, about)]
struct Cli {
    /// Settings file path.
    #[arg(
        long,
        env = "BUGRELAY_SETTINGS",
        default_value = "bugrelay.toml",
        global = true
    )]
    settings: std::path::PathBuf,

    /// Deployment constants file pinning the helpdesk credentials.
    #[arg(
        long,
        env = "BUGRELAY_CONSTANTS",
        default_value = "freescout.config.json",
        global = true
    )]
    constants: std::path::PathBuf,

    /// Helpdesk base URL, overriding stored settings.
    #[arg(long, env = "BUGRELAY_ENDPOINT", global = true)]
    endpoint: Option<String>,

    /// API key, overriding stored settings.
    #[arg(long, env = "BUGRELAY_API_KEY", global = true)]
    api_key: Option<String>,

    /// Target mailbox id, overriding stored settings.
    #[arg(long, env = "BUGRELAY_MAILBOX_ID", global = true)]
    mailbox_id: Option<String>,

    /// Output format.
    #[arg(long, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a bug report with its captured media.
    Submit(commands::submit::SubmitArgs),
    /// Verify the helpdesk is reachable with the effective credentials.
    Test,
    /// Inspect or change stored settings.
    Config(commands::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let constants = DeploymentConstants::load(&cli.constants);
    let provider = SettingsProvider::new(FileStore::new(&cli.settings), constants);

    // Command-line overrides beat both stored settings and the pinned
    // deployment constants.
    let settings = provider.settings()?;
    let config = HelpdeskConfig::new(
        cli.endpoint.unwrap_or(settings.endpoint),
        cli.api_key.unwrap_or(settings.api_key),
        cli.mailbox_id.unwrap_or(settings.mailbox_id),
    )
    .with_default_assignee(settings.default_assignee)
    .with_max_file_size(settings.max_file_size);
    let client = HelpdeskClient::new(config);

    match cli.command {
        Command::Submit(args) => commands::submit::run(&client, &args, &cli.format).await,
        Command::Test => commands::test::run(&client, &cli.format).await,
        Command::Config(args) => commands::config::run(&provider, &args, &cli.format),
    }
}
