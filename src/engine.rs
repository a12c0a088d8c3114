//! # Generation cycle
//! `(sources, params) -> ranked batch`, plus the history append and trend read.
//!
//! The batch is returned to the caller and not retained; whoever displays it
//! owns it. Scoring and classification run synchronously after all fetches.

use anyhow::{Context, Result};
use chrono::Duration;
use metrics::counter;
use tracing::info;

use crate::analyze::InsightCard;
use crate::history::HistoryStore;
use crate::ingest::{self, types::FeedSource, types::RawItem};
use crate::rank::rank_cards;
use crate::sentiment::SentimentScorer;
use crate::trend::{hourly_trend, HourlyTrend};

/// Score and classify each item, preserving input order.
pub fn build_cards(items: &[RawItem], scorer: &dyn SentimentScorer) -> Vec<InsightCard> {
    items
        .iter()
        .map(|it| {
            let text = it.scoring_text();
            let score = if text.is_empty() {
                0.0
            } else {
                scorer.score(&text)
            };
            InsightCard::from_raw(it, score)
        })
        .collect()
}

/// Ingest every source, build cards, and rank them.
pub async fn generate_batch(
    sources: &[Box<dyn FeedSource>],
    scorer: &dyn SentimentScorer,
    per_source: usize,
) -> Vec<InsightCard> {
    let items = ingest::run_once(sources, per_source).await;
    let mut cards = build_cards(&items, scorer);
    rank_cards(&mut cards);
    counter!("insight_cards_generated_total").increment(cards.len() as u64);
    cards
}

/// One full cycle: generate, then append the batch to history.
/// An append failure is returned; the batch is lost to the caller in that case.
pub async fn run_cycle(
    sources: &[Box<dyn FeedSource>],
    scorer: &dyn SentimentScorer,
    store: &mut dyn HistoryStore,
    per_source: usize,
) -> Result<Vec<InsightCard>> {
    let cards = generate_batch(sources, scorer, per_source).await;
    let written = store.append(&cards).context("appending batch to history")?;
    info!(
        target: "insight",
        sources = sources.len(),
        cards = cards.len(),
        history_rows = written.len(),
        "generation cycle finished"
    );
    Ok(cards)
}

/// Hourly trend over the trailing `window`.
pub fn load_trend(store: &dyn HistoryStore, window: Duration) -> Result<HourlyTrend> {
    let records = store
        .query_since(window)
        .context("querying history window")?;
    Ok(hourly_trend(&records))
}
