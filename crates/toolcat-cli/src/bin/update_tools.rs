// Refresh the tool YAML records from GitHub. Reads GITHUB_TOKEN if set.
use clap::Parser;
use std::sync::Arc;
use toolcat_api::RetryConfig;
use toolcat_cli::{github_client, init_tracing};
use toolcat_core::providers::GitHubProvider;
use toolcat_core::{BatchUpdater, Config, RecordOutcome};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "update-tools")]
#[command(version, about = "Update tool records with stars, licenses and authors from GitHub", long_about = None)]
struct Cli {}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let _ = Cli::parse();

    let config = Config::load()?;
    let dir = config.dataset.tools_dir.clone();

    let client = github_client(&config, RetryConfig::default())?.with_response_cache();
    if !client.is_authenticated() {
        warn!("GITHUB_TOKEN not set; unauthenticated requests are limited to 60 per hour");
    }

    let updater = BatchUpdater::with_options(
        Arc::new(GitHubProvider::new(client)),
        (&config.updater).into(),
    );

    info!("Reading tool records from {}", dir.display());
    let summary = updater
        .run(&dir, |path, outcome| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            match outcome {
                RecordOutcome::Updated(changes) => {
                    println!("✓ Updated {}", name);
                    for change in changes {
                        println!("  - {}", change);
                    }
                }
                RecordOutcome::Unchanged => println!("  No changes for {}", name),
                RecordOutcome::Skipped(reason) => println!("⚠ Skipping {}: {}", name, reason),
                RecordOutcome::Failed(message) => println!("✗ Error processing {}: {}", name, message),
            }
        })
        .await?;

    println!("\nUpdate complete ({} records):", summary.total());
    println!("  Updated:   {}", summary.updated);
    println!("  Unchanged: {}", summary.unchanged);
    println!("  Skipped:   {}", summary.skipped);
    println!("  Errors:    {}", summary.errors);

    Ok(())
}
