//! Asset Insight Service — Binary Entrypoint
//! Boots the Axum HTTP server over the insight pipeline: feeds from config,
//! the bundled lexicon scorer, and the CSV history log.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use asset_insight::{
    api::{self, AppState},
    config::AppConfig,
    history::CsvHistoryStore,
    ingest::providers::sources_from_urls,
    metrics::Metrics,
    sentiment::LexiconScorer,
    telemetry,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let cfg = AppConfig::load_default().context("loading config")?;
    let sources = sources_from_urls(&cfg.feeds, cfg.fetch_timeout_secs.map(Duration::from_secs))?;
    let store = CsvHistoryStore::open(&cfg.history_path)
        .with_context(|| format!("opening history at {}", cfg.history_path.display()))?;
    let metrics = Metrics::init()?;

    let state = AppState::new(
        sources,
        Arc::new(LexiconScorer::new()),
        Box::new(store),
        cfg.defaults.clone(),
    );
    let app = api::router(state).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    info!(
        addr = %cfg.bind_addr,
        feeds = cfg.feeds.len(),
        history = %cfg.history_path.display(),
        "insight service listening"
    );
    axum::serve(listener, app).await.context("http server")?;
    Ok(())
}
