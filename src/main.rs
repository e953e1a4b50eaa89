//! Interpelli Ingestion Worker — Binary Entrypoint
//! Boots the crawl orchestrator: config, store pool, migrations, cycle loop.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use interpelli_ingest::config::Config;
use interpelli_ingest::orchestrator::Orchestrator;
use interpelli_ingest::store::postgres::PgStore;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = Config::from_env()?;
    let store = PgStore::connect(&config.database_url).await?;
    store.run_migrations().await?;

    Orchestrator::new(config, store)?.run().await
}
