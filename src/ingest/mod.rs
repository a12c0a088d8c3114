// src/ingest/mod.rs
pub mod feed;
pub mod providers;
pub mod types;

use crate::ingest::types::{FeedEntry, FeedSource, ParsedFeed, RawItem, UNKNOWN_SOURCE};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use std::collections::HashSet;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "ingest_items_total",
            "Items kept after normalization + dedup."
        );
        describe_counter!(
            "ingest_dedup_total",
            "Items removed as duplicates (link + title)."
        );
        describe_counter!(
            "ingest_source_errors_total",
            "Feed fetch/parse errors."
        );
        describe_histogram!("ingest_fetch_ms", "Per-source fetch+parse time in milliseconds.");
    });
}

/// Trim an optional feed field; missing becomes "".
fn clean_field(v: Option<&str>) -> String {
    v.map(str::trim).unwrap_or_default().to_string()
}

/// Trim an optional field; missing or blank becomes `None`.
fn non_blank(v: Option<&str>) -> Option<String> {
    v.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Feed title, or [`UNKNOWN_SOURCE`] when the feed has none.
pub fn source_name(feed: &ParsedFeed) -> String {
    non_blank(feed.title.as_deref()).unwrap_or_else(|| UNKNOWN_SOURCE.to_string())
}

/// Normalize one entry. `published` wins over `updated`.
pub fn normalize_entry(source: &str, entry: &FeedEntry) -> RawItem {
    RawItem {
        source: source.to_string(),
        title: clean_field(entry.title.as_deref()),
        summary: clean_field(entry.summary.as_deref()),
        link: clean_field(entry.link.as_deref()),
        published: non_blank(entry.published.as_deref())
            .or_else(|| non_blank(entry.updated.as_deref())),
    }
}

/// Take up to `per_source` entries of a parsed feed as raw items, in feed order.
pub fn items_from_feed(feed: &ParsedFeed, per_source: usize) -> Vec<RawItem> {
    let source = source_name(feed);
    feed.entries
        .iter()
        .take(per_source)
        .map(|e| normalize_entry(&source, e))
        .collect()
}

/// Drop repeated `link + title` keys, keeping the first occurrence.
/// Items with an empty key are never treated as duplicates.
/// Returns (kept, dedup_count).
pub fn dedup_items(items: Vec<RawItem>) -> (Vec<RawItem>, usize) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut keep = Vec::with_capacity(items.len());
    let mut dedup_out = 0usize;

    for it in items {
        let key = it.dedup_key();
        if !key.is_empty() && !seen.insert(key) {
            dedup_out += 1;
            continue;
        }
        keep.push(it);
    }

    (keep, dedup_out)
}

/// Fetch every source in order and return the deduplicated items.
/// A failing source contributes nothing; the rest of the batch proceeds.
pub async fn run_once(sources: &[Box<dyn FeedSource>], per_source: usize) -> Vec<RawItem> {
    ensure_metrics_described();

    let mut raw = Vec::new();
    for s in sources {
        let t0 = std::time::Instant::now();
        match s.fetch().await {
            Ok(feed) => {
                let mut v = items_from_feed(&feed, per_source);
                tracing::debug!(source = s.name(), items = v.len(), "feed fetched");
                raw.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(error = ?e, source = s.name(), "feed source error");
                counter!("ingest_source_errors_total").increment(1);
            }
        }
        histogram!("ingest_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    }

    let (kept, dedup_cnt) = dedup_items(raw);

    // Telemetry
    counter!("ingest_items_total").increment(kept.len() as u64);
    counter!("ingest_dedup_total").increment(dedup_cnt as u64);

    kept
}
