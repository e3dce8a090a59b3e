//! tringest - astronomical transient report acquisition tool.
//!
//! Ingests one transient detection report from an observatory web server:
//! metadata, classification images and an idempotent database record.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if tringest::cli::is_verbose() {
        "tringest=info"
    } else {
        "tringest=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Run one ingestion pass
    tringest::cli::run().await
}
