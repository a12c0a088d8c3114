#![cfg(feature = "live-feeds")] // compile & run only when explicitly enabled

use std::time::Duration;

use asset_insight::config::AppConfig;
use asset_insight::ingest::{providers::sources_from_urls, run_once};

/// Fetch the default public feeds over the network.
/// Enable via: `cargo test --features live-feeds --test live_feeds`
#[tokio::test]
async fn default_feeds_yield_items() {
    let cfg = AppConfig::default();
    let sources =
        sources_from_urls(&cfg.feeds, Some(Duration::from_secs(20))).expect("build http sources");
    let items = run_once(&sources, 3).await;
    assert!(
        !items.is_empty(),
        "at least one public feed should be reachable"
    );
    assert!(items.len() <= 3 * cfg.feeds.len());
}
