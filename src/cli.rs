//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;
use console::style;

use crate::config::Settings;
use crate::repository::SqliteTransientRepository;
use crate::scrape::HttpClient;
use crate::services::{IngestOutcome, IngestPipeline};

#[derive(Parser)]
#[command(name = "tringest")]
#[command(about = "Astronomical transient report acquisition and ingestion")]
#[command(version)]
pub struct Cli {
    /// Transient report URL
    #[arg(short = 'i', long)]
    url: String,

    /// Path to the settings file
    #[arg(long, default_value = "etc/tringest.toml", env = "TRINGEST_CONFIG")]
    config: PathBuf,

    /// Override the image root from the settings file
    #[arg(long)]
    image_root: Option<PathBuf>,

    /// Override the database path from the settings file
    #[arg(long)]
    database: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

/// Parse arguments and run one ingestion pass.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(&cli.config)?;
    if let Some(image_root) = cli.image_root {
        settings.storage.image_root = image_root;
    }
    if let Some(database) = cli.database {
        settings.database.path = database;
    }

    let repo = SqliteTransientRepository::new(&settings.database.path)?;
    let client = HttpClient::new(&settings.server)?;
    let pipeline = IngestPipeline::new(repo, client, settings);

    match pipeline.run(&cli.url).await? {
        IngestOutcome::AlreadyComplete => {
            println!(
                "{} transient already ingested, nothing to do",
                style("skipped").yellow()
            );
        }
        IngestOutcome::Inserted => {
            println!("{} new transient record", style("inserted").green());
        }
        IngestOutcome::Updated => {
            println!(
                "{} artifact columns of existing record",
                style("updated").green()
            );
        }
    }

    Ok(())
}
