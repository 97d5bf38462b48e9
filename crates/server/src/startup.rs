use std::net::SocketAddr;

use axum::Router;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use service::{directory::RESOURCE_NAME, runtime, storage, DirectoryService};

use crate::routes;
use crate::state::{AppState, AuthSettings};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Open the configured store and wrap it for request handlers.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    runtime::ensure_storage(&cfg.storage).await?;
    if !runtime::document_present(&cfg.storage).await {
        warn!(file_path = %cfg.storage.file_path, "document file not found; run the seed tool before serving requests");
    }
    let store = storage::open(&cfg.storage, RESOURCE_NAME).await?;
    Ok(AppState::new(DirectoryService::new(store), AuthSettings::from(&cfg.auth)))
}

pub fn build_app(state: AppState) -> Router {
    routes::build_router(state, build_cors())
}

/// Public entry: build the app and run the HTTP server
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let state = build_state(&cfg).await?;
    let app = build_app(state);

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, "starting user directory server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
