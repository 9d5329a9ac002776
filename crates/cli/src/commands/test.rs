use bugrelay_client::HelpdeskClient;

use crate::OutputFormat;

pub async fn run(client: &HelpdeskClient, format: &OutputFormat) -> anyhow::Result<()> {
    match client.test_connection().await {
        Ok(()) => {
            match format {
                OutputFormat::Json => println!(r#"{{"ok": true}}"#),
                OutputFormat::Text => println!("Helpdesk reachable, credentials accepted."),
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Connection test failed: {e}");
            std::process::exit(1);
        }
    }
}
