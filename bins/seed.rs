//! Writes the initial collection document into the configured backend.
//!
//! The payload comes from the first argument (a path to a JSON file), or from
//! `DATABASE_DATA`; with neither, an empty `{"users": {}}` document is written.

use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;

use service::{directory::RESOURCE_NAME, runtime, seed, storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cfg = configs::AppConfig::load_and_validate()?;
    common::utils::logging::init_logging(&cfg.server.log_format);

    let payload = match std::env::args().nth(1) {
        Some(path) => Some(
            tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("cannot read seed file {}", path))?,
        ),
        None => std::env::var("DATABASE_DATA").ok(),
    };

    runtime::ensure_storage(&cfg.storage).await?;
    let store = storage::open(&cfg.storage, RESOURCE_NAME).await?;
    seed::init_db(store.as_ref(), RESOURCE_NAME, payload.as_deref()).await?;
    info!(backend = ?cfg.storage.backend, "seeding finished");
    Ok(())
}
