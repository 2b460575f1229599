use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod settings;

use cli::Cli;
use settings::Settings;
use jobstore_db::{ConnectionManager, RecordStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    init_tracing(&settings.logging.format);

    run(cli, settings).await
}

fn init_tracing(format: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "jobstore_cli=info,jobstore_db=info".into());

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn run(cli: Cli, settings: Settings) -> Result<()> {
    tracing::debug!(
        host = %settings.database.host,
        port = settings.database.port,
        database = %settings.database.name,
        "Loaded settings"
    );

    let connection = ConnectionManager::open(&settings.database).await?;
    let store = RecordStore::postgres(&connection, settings.query.default_limit);

    let outcome = commands::execute(cli.command, &connection, &store).await;

    connection.close().await;
    outcome
}
