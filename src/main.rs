//! Operator binary for the Bluesky integration
//!
//! Verifies credentials against the live service and dumps what the platform
//! would see: a profile, a follower/follow listing, or a follower count.

mod cli;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use comics_bluesky::{AppContext, Config};

use crate::cli::{CliOptions, Command, USAGE};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let options = CliOptions::from_args();
    init_tracing(options.json_logs);

    let Some(command) = options.command else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::debug!(?config, "Configuration loaded");

    let context = AppContext::new(config).context("Failed to build Bluesky client")?;
    if !context.bluesky_configured() {
        tracing::warn!("BLUESKY_IDENTIFIER or BLUESKY_APP_PASSWORD is not set");
    }

    let bluesky = &context.bluesky;
    let output = match command {
        Command::Profile(handle) => serde_json::to_value(
            bluesky
                .get_profile(&handle)
                .await
                .with_context(|| format!("Failed to fetch profile for {handle}"))?,
        )?,
        Command::Followers(actor) => serde_json::to_value(
            bluesky
                .fetch_all_followers(&actor)
                .await
                .with_context(|| format!("Failed to fetch followers of {actor}"))?,
        )?,
        Command::Follows(actor) => serde_json::to_value(
            bluesky
                .fetch_all_follows(&actor)
                .await
                .with_context(|| format!("Failed to fetch follows of {actor}"))?,
        )?,
        Command::FollowerCount(handle) => {
            let count = bluesky
                .get_follower_count(&handle)
                .await
                .with_context(|| format!("Failed to count followers of {handle}"))?;
            serde_json::json!({ "handle": handle, "followers": count })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn init_tracing(json: bool) {
    let json = json || std::env::var("LOG_FORMAT").is_ok_and(|v| v == "json");
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "comics_bluesky=info".into());

    // Logs go to stderr so stdout stays parseable JSON
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
