//! # grc-api — Binary Entry Point
//!
//! Starts the Axum HTTP server. Configuration comes from the environment
//! (see [`grc_api::config`]); the store is seeded from `GRC_SNAPSHOT` when set.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use grc_api::{ApiConfig, AppState};
use grc_core::SystemClock;
use grc_store::{MemoryStore, Snapshot};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::from_env()?;
    init_tracing(config.log_json);

    let store = match &config.snapshot {
        Some(path) => {
            let snapshot = Snapshot::load(path)
                .with_context(|| format!("loading snapshot {}", path.display()))?;
            MemoryStore::from_snapshot(snapshot)?
        }
        None => {
            tracing::warn!("GRC_SNAPSHOT not set; starting with an empty store");
            MemoryStore::new()
        }
    };

    let state = AppState::new(Arc::new(store), Arc::new(SystemClock));
    let app = grc_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("GRC API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
