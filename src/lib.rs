// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod analyze;
pub mod api;
pub mod config;
pub mod engine;
pub mod history;
pub mod ingest;
pub mod metrics;
pub mod rank;
pub mod sentiment;
pub mod telemetry;
pub mod trend;

// ---- Re-exports for stable public API ----
pub use crate::analyze::{Conviction, InsightCard, Label, TriggerTag};
pub use crate::api::router;
pub use crate::config::AppConfig;
pub use crate::engine::{build_cards, generate_batch, load_trend, run_cycle};
pub use crate::history::{CsvHistoryStore, HistoryRecord, HistoryStore, MemoryHistoryStore};
pub use crate::ingest::types::{FeedSource, RawItem};
pub use crate::rank::{is_high_impact, rank_cards, select_view, ViewMode};
pub use crate::sentiment::{LexiconScorer, SentimentScorer};
pub use crate::trend::{hourly_trend, HourlyTrend};
