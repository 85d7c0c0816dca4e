mod api;
mod config;
mod error;
mod metrics;
mod poller;
mod state;
mod ui;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, watch};
use tracing::info;
use tracing_subscriber::EnvFilter;

use api::client::ApiClient;
use api::Backend;
use config::Config;
use state::query_cache::QueryCache;

/// Poller→UI channel buffer. Small: events are coalesced redraw hints.
const UI_EVENT_BUFFER: usize = 256;

fn init_tracing(config: &Config) -> Result<()> {
    // The terminal belongs to the UI, so logs go to a file.
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("failed to open log file {}", config.log_file.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(file)
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config)?;
    crate::metrics::prometheus::init_exporter(config.metrics_port);

    info!(api_base = %config.api_base, "crypto-dashboard starting");

    let backend: Arc<dyn Backend> = Arc::new(ApiClient::new(&config.api_base));

    // One process-wide query cache, shared by the pollers and the UI for
    // the lifetime of the process. Cheap to clone (just an Arc bump).
    let cache = QueryCache::new();

    let (tx, rx) = mpsc::channel(UI_EVENT_BUFFER);
    let (identity_tx, identity_rx) = watch::channel(Vec::new());

    let portfolio = tokio::spawn(poller::portfolio::run(
        backend.clone(),
        cache.clone(),
        identity_tx,
        tx.clone(),
    ));
    let prices = tokio::spawn(poller::prices::run(
        backend.clone(),
        cache.clone(),
        identity_rx,
        tx.clone(),
    ));
    let recommendations = tokio::spawn(poller::recommendations::run(
        backend.clone(),
        cache.clone(),
        tx.clone(),
    ));

    let terminal = ratatui::init();
    let result = ui::App::new(cache, backend, rx, tx).run(terminal).await;
    ratatui::restore();

    portfolio.abort();
    prices.abort();
    recommendations.abort();

    info!("crypto-dashboard stopped");
    result
}
